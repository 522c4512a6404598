//! Provides an implementation of a manually populated in-memory CRL store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use der::Decode;
use log::error;
use x509_cert::crl::CertificateList;
use x509_cert::ext::pkix::name::GeneralName;
use x509_cert::name::Name;

use const_oid::db::rfc5912::ID_CE_CRL_DISTRIBUTION_POINTS;

use crate::environment::pki_environment_traits::CrlSource;
use crate::util::error::*;
use crate::util::pdv_utilities::name_to_string;
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};

/// Structure containing CRL buffers indexed by the RFC 4514 string representation of the CRL
/// issuer name. The store accepts both complete and delta CRLs; scope determinations are left to
/// the revocation checking machinery.
#[derive(Default)]
pub struct CrlSourceMemory {
    /// Maps CRL issuer names onto a list of CRL buffers
    crls: Mutex<BTreeMap<String, Vec<Vec<u8>>>>,
}

impl CrlSourceMemory {
    /// instantiates a new CrlSourceMemory
    pub fn new() -> CrlSourceMemory {
        Default::default()
    }

    /// add_crl_buffer parses the presented buffer and adds it to the store upon success.
    pub fn add_crl_buffer(&self, crl_buf: &[u8]) -> Result<()> {
        match CertificateList::from_der(crl_buf) {
            Ok(crl) => self.add_crl(crl_buf, &crl),
            Err(e) => {
                error!("Failed to parse CRL presented to CRL store: {}", e);
                Err(Error::Asn1Error(e))
            }
        }
    }
}

impl CrlSource for CrlSourceMemory {
    fn get_crls(&self, cert: &PDVCertificate) -> Result<Vec<Vec<u8>>> {
        let mut names = vec![name_to_string(&cert.decoded_cert.tbs_certificate.issuer)];

        // CRL issuers named in the CRL DP extension are consulted too, to serve indirect CRLs
        if let Ok(Some(PDVExtension::CrlDistributionPoints(crl_dps))) =
            cert.get_extension(&ID_CE_CRL_DISTRIBUTION_POINTS)
        {
            for dp in &crl_dps.0 {
                if let Some(crl_issuer) = &dp.crl_issuer {
                    for gn in crl_issuer {
                        if let GeneralName::DirectoryName(dn) = gn {
                            let name_str = name_to_string(dn);
                            if !names.contains(&name_str) {
                                names.push(name_str);
                            }
                        }
                    }
                }
            }
        }

        let guard = match self.crls.lock() {
            Ok(g) => g,
            Err(_) => return Err(Error::Unrecognized),
        };
        let mut retval = vec![];
        for name in names {
            if let Some(crls) = guard.get(&name) {
                for crl in crls {
                    retval.push(crl.clone());
                }
            }
        }
        if retval.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(retval)
    }

    fn get_crls_for_name(&self, name: &Name) -> Result<Vec<Vec<u8>>> {
        let guard = match self.crls.lock() {
            Ok(g) => g,
            Err(_) => return Err(Error::Unrecognized),
        };
        if let Some(crls) = guard.get(&name_to_string(name)) {
            if !crls.is_empty() {
                return Ok(crls.clone());
            }
        }
        Err(Error::NotFound)
    }

    fn add_crl(&self, crl_buf: &[u8], crl: &CertificateList) -> Result<()> {
        let name = name_to_string(&crl.tbs_cert_list.issuer);
        let mut guard = match self.crls.lock() {
            Ok(g) => g,
            Err(_) => return Err(Error::Unrecognized),
        };
        let entry = guard.entry(name).or_default();
        if !entry.iter().any(|b| b == crl_buf) {
            entry.push(crl_buf.to_vec());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::BitString;
    use der::Encode;
    use spki::AlgorithmIdentifierOwned;
    use std::str::FromStr;
    use std::time::Duration;
    use x509_cert::crl::TbsCertList;
    use x509_cert::time::Time;
    use x509_cert::Version;

    use crate::util::pdv_alg_oids::PKIXALG_SHA256_WITH_RSA_ENCRYPTION;

    fn make_crl(issuer: &str) -> CertificateList {
        let alg = AlgorithmIdentifierOwned {
            oid: PKIXALG_SHA256_WITH_RSA_ENCRYPTION,
            parameters: None,
        };
        CertificateList {
            tbs_cert_list: TbsCertList {
                version: Version::V2,
                signature: alg.clone(),
                issuer: Name::from_str(issuer).unwrap(),
                this_update: Time::GeneralTime(
                    der::asn1::GeneralizedTime::from_unix_duration(Duration::from_secs(
                        1700000000,
                    ))
                    .unwrap(),
                ),
                next_update: None,
                revoked_certificates: None,
                crl_extensions: None,
            },
            signature_algorithm: alg,
            signature: BitString::from_bytes(&[0u8]).unwrap(),
        }
    }

    #[test]
    fn add_and_get_by_name() {
        let source = CrlSourceMemory::new();
        let crl = make_crl("CN=CA,O=Example,C=US");
        let enc = crl.to_der().unwrap();
        assert!(source.add_crl(&enc, &crl).is_ok());
        // duplicate add does not duplicate storage
        assert!(source.add_crl(&enc, &crl).is_ok());

        let name = Name::from_str("CN=CA,O=Example,C=US").unwrap();
        let crls = source.get_crls_for_name(&name).unwrap();
        assert_eq!(1, crls.len());
        assert_eq!(enc, crls[0]);

        let other = Name::from_str("CN=Other,O=Example,C=US").unwrap();
        assert!(source.get_crls_for_name(&other).is_err());
    }
}
