//! Object identifiers used by CMS.

use crate::oid::{ConstOid, Oid};


//------------ Content Types -------------------------------------------------

/// id-data: arbitrary octet strings.
pub const ID_DATA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 1]);

/// id-signedData.
pub const ID_SIGNED_DATA: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 2]);

/// id-envelopedData.
pub const ID_ENVELOPED_DATA: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 7, 3]);

/// id-ct-authData.
pub const ID_CT_AUTH_DATA: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 2]);

/// id-ct-compressedData.
pub const ID_CT_COMPRESSED_DATA: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 9]);

/// id-ct-authEnvelopedData.
pub const ID_CT_AUTH_ENVELOPED_DATA: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 1, 23]);


//------------ Attribute Types -----------------------------------------------

/// id-contentType.
pub const ID_CONTENT_TYPE: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 3]);

/// id-messageDigest.
pub const ID_MESSAGE_DIGEST: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 4]);

/// id-signingTime.
pub const ID_SIGNING_TIME: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 5]);

/// id-countersignature.
pub const ID_COUNTER_SIGNATURE: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 6]);


//------------ Algorithms ----------------------------------------------------

/// id-sha256.
pub const SHA256: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 2, 1]);

/// sha256WithRSAEncryption.
pub const SHA256_WITH_RSA_ENCRYPTION: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 11]);

/// rsaEncryption.
pub const RSA_ENCRYPTION: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 1, 1]);

/// id-aes128-CBC.
pub const AES128_CBC: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 1, 2]);

/// id-aes128-GCM.
pub const AES128_GCM: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 1, 6]);

/// id-aes128-wrap.
pub const AES128_WRAP: ConstOid = Oid(&[96, 134, 72, 1, 101, 3, 4, 1, 5]);

/// hmac-with-SHA256.
pub const HMAC_WITH_SHA256: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 2, 9]);

/// id-PBKDF2.
pub const PBKDF2: ConstOid = Oid(&[42, 134, 72, 134, 247, 13, 1, 5, 12]);

/// id-alg-zlibCompress.
pub const ZLIB_COMPRESS: ConstOid =
    Oid(&[42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 8]);
