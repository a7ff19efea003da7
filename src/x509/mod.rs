//! Parts of X.509 used inside CMS.
//!
//! Certificates themselves are kept as captured values. This module only
//! contains the few X.509 types that CMS structures or attribute
//! certificates need to look into: times, general names, distribution
//! points and the information of attribute certificates.

pub use self::attrcert::{
    AttCertIssuer, AttCertValidityPeriod, AttributeCertificateInfo, V2Form,
};
pub use self::name::{
    DistributionPoint, DistributionPointName, GeneralName, GeneralNames,
    OtherName,
};
pub use self::time::Time;

mod attrcert;
mod name;
mod time;
