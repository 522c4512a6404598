//! Wrappers around asn.1 encoder/decoder structures to support trust anchor processing

use der::asn1::ObjectIdentifier;
use der::{Decode, Encode};
use spki::SubjectPublicKeyInfoOwned;
use x509_cert::anchor::TrustAnchorChoice;
use x509_cert::ext::{pkix::crl::CrlDistributionPoints, pkix::*};
use x509_cert::name::Name;
use x509_cert::Certificate;

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_CRL_DISTRIBUTION_POINTS, ID_CE_EXT_KEY_USAGE, ID_CE_ISSUER_ALT_NAME, ID_CE_KEY_USAGE,
    ID_CE_NAME_CONSTRAINTS, ID_CE_POLICY_CONSTRAINTS, ID_CE_POLICY_MAPPINGS,
    ID_PE_AUTHORITY_INFO_ACCESS, ID_PE_SUBJECT_INFO_ACCESS,
};

use crate::util::error::*;
use crate::validator::path_validator::EXTS_OF_INTEREST;
use crate::validator::pdv_certificate::Asn1Metadata;
use crate::validator::pdv_extension::*;

/// [`PDVTrustAnchorChoice`] is used to aggregate a binary TrustAnchorChoice, a parsed
/// TrustAnchorChoice, optional metadata and parsed extensions in support of certification path
/// development and validation operations.
#[derive(Clone, Eq, PartialEq)]
pub struct PDVTrustAnchorChoice {
    /// Binary, encoded TrustAnchorChoice object
    pub encoded_ta: Vec<u8>,
    /// Decoded TrustAnchorChoice object
    pub decoded_ta: TrustAnchorChoice,
    /// Optional metadata about the trust anchor
    pub metadata: Option<Asn1Metadata>,
    /// Parsed extensions from the TrustAnchorChoice
    pub parsed_extensions: ParsedExtensions,
}

impl TryFrom<&[u8]> for PDVTrustAnchorChoice {
    type Error = der::Error;

    fn try_from(enc_ta: &[u8]) -> der::Result<Self> {
        let ta = TrustAnchorChoice::from_der(enc_ta)?;
        let mut pdv_ta = PDVTrustAnchorChoice {
            encoded_ta: enc_ta.to_vec(),
            decoded_ta: ta,
            metadata: None,
            parsed_extensions: Default::default(),
        };
        pdv_ta.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_ta)
    }
}

impl TryFrom<Certificate> for PDVTrustAnchorChoice {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        let ta = TrustAnchorChoice::from_der(&enc_cert)?;
        let mut pdv_ta = PDVTrustAnchorChoice {
            encoded_ta: enc_cert,
            decoded_ta: ta,
            metadata: None,
            parsed_extensions: Default::default(),
        };
        pdv_ta.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_ta)
    }
}

impl ExtensionProcessing for PDVTrustAnchorChoice {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns a
    /// previously parsed PDVExtension instance containing the decoded extension if the extension
    /// was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>> {
        Ok(self.parsed_extensions.get(oid))
    }

    fn parse_extensions(&mut self, oids: &[ObjectIdentifier]) {
        for oid in oids {
            let _r = self.parse_extension(oid);
        }
    }

    fn parse_extension(&mut self, oid: &ObjectIdentifier) -> Result<Option<&PDVExtension>> {
        macro_rules! add_and_return {
            ($pe:ident, $v:ident, $oid:ident, $t:ident) => {
                match $t::from_der($v) {
                    Ok(r) => {
                        let ext = PDVExtension::$t(r);
                        $pe.insert(*$oid, ext);
                        return Ok($pe.get($oid));
                    }
                    Err(e) => {
                        return Err(Error::Asn1Error(e));
                    }
                }
            };
        }

        let pe = &mut self.parsed_extensions;
        if pe.contains_key(oid) {
            return Ok(pe.get(oid));
        }

        let exts = match &self.decoded_ta {
            TrustAnchorChoice::Certificate(c) => &c.tbs_certificate.extensions,
            TrustAnchorChoice::TaInfo(tai) => {
                if let Some(cp) = &tai.cert_path {
                    // TrustAnchorInfo may override some extensions per RFC 5914. The nameConstr
                    // and policySet fields are honored here; remaining overrides are read from
                    // the wrapped certificate, if any.
                    if *oid == ID_CE_NAME_CONSTRAINTS {
                        if let Some(nc) = &cp.name_constr {
                            let ext = PDVExtension::NameConstraints(nc.clone());
                            pe.insert(*oid, ext);
                            return Ok(pe.get(oid));
                        }
                    } else if *oid == ID_CE_CERTIFICATE_POLICIES {
                        if let Some(cp) = &cp.policy_set {
                            let ext = PDVExtension::CertificatePolicies(cp.clone());
                            pe.insert(*oid, ext);
                            return Ok(pe.get(oid));
                        }
                    }

                    if let Some(c) = &cp.certificate {
                        &c.tbs_certificate.extensions
                    } else {
                        &None
                    }
                } else {
                    &None
                }
            }
            _ => {
                return Err(Error::Unrecognized);
            }
        };

        if let Some(exts) = exts.as_ref() {
            if let Some(i) = exts.iter().find(|&ext| ext.extn_id == *oid) {
                let v = i.extn_value.as_bytes();
                match *oid {
                    ID_CE_BASIC_CONSTRAINTS => {
                        add_and_return!(pe, v, oid, BasicConstraints);
                    }
                    ID_CE_SUBJECT_KEY_IDENTIFIER => {
                        add_and_return!(pe, v, oid, SubjectKeyIdentifier);
                    }
                    ID_CE_EXT_KEY_USAGE => {
                        add_and_return!(pe, v, oid, ExtendedKeyUsage);
                    }
                    ID_PE_AUTHORITY_INFO_ACCESS => {
                        add_and_return!(pe, v, oid, AuthorityInfoAccessSyntax);
                    }
                    ID_PE_SUBJECT_INFO_ACCESS => {
                        add_and_return!(pe, v, oid, SubjectInfoAccessSyntax);
                    }
                    ID_CE_KEY_USAGE => {
                        add_and_return!(pe, v, oid, KeyUsage);
                    }
                    ID_CE_SUBJECT_ALT_NAME => {
                        add_and_return!(pe, v, oid, SubjectAltName);
                    }
                    ID_CE_ISSUER_ALT_NAME => {
                        add_and_return!(pe, v, oid, IssuerAltName);
                    }
                    ID_CE_NAME_CONSTRAINTS => {
                        add_and_return!(pe, v, oid, NameConstraints);
                    }
                    ID_CE_CRL_DISTRIBUTION_POINTS => {
                        add_and_return!(pe, v, oid, CrlDistributionPoints);
                    }
                    ID_CE_CERTIFICATE_POLICIES => {
                        add_and_return!(pe, v, oid, CertificatePolicies);
                    }
                    ID_CE_POLICY_MAPPINGS => {
                        add_and_return!(pe, v, oid, PolicyMappings);
                    }
                    ID_CE_AUTHORITY_KEY_IDENTIFIER => {
                        add_and_return!(pe, v, oid, AuthorityKeyIdentifier);
                    }
                    ID_CE_POLICY_CONSTRAINTS => {
                        add_and_return!(pe, v, oid, PolicyConstraints);
                    }
                    ID_CE_INHIBIT_ANY_POLICY => {
                        add_and_return!(pe, v, oid, InhibitAnyPolicy);
                    }
                    _ => {
                        // ignore unrecognized
                    }
                }
            }
        }
        Ok(None)
    }
}

/// [`get_trust_anchor_name`] returns the name of the trust anchor.
///
/// The name is as read from either the subject field of a certificate if the Certificate option
/// is used or from the CertPathControls field within a TrustAnchorInfo if that option is used.
pub fn get_trust_anchor_name(ta: &TrustAnchorChoice) -> Result<&Name> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => {
            return Ok(&cert.tbs_certificate.subject);
        }
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cert_path) = &tai.cert_path {
                return Ok(&cert_path.ta_name);
            }
        }
        TrustAnchorChoice::TbsCertificate(cert) => {
            return Ok(&cert.subject);
        }
    }
    Err(Error::PathValidation(
        PathValidationStatus::MissingTrustAnchorName,
    ))
}

/// `get_subject_public_key_info_from_trust_anchor` returns a reference to the subject public key
/// contained in a TrustAnchorChoice object:
/// - Certificate.tbs_certificate.subject_public_key_info
/// - TrustAnchorInfo.pub_key field.
pub fn get_subject_public_key_info_from_trust_anchor(
    ta: &TrustAnchorChoice,
) -> &SubjectPublicKeyInfoOwned {
    match ta {
        TrustAnchorChoice::Certificate(cert) => &cert.tbs_certificate.subject_public_key_info,
        TrustAnchorChoice::TaInfo(tai) => &tai.pub_key,
        TrustAnchorChoice::TbsCertificate(tbs) => &tbs.subject_public_key_info,
    }
}

/// `get_certificate_from_trust_anchor` returns the certificate from the TrustAnchorChoice. This
/// will be either the Certificate choice itself or the TrustAnchorInfo.cert_path.certificate field.
pub fn get_certificate_from_trust_anchor(ta: &TrustAnchorChoice) -> Option<&Certificate> {
    match ta {
        TrustAnchorChoice::Certificate(cert) => Some(cert),
        TrustAnchorChoice::TaInfo(tai) => {
            if let Some(cp) = &tai.cert_path {
                if let Some(cert) = &cp.certificate {
                    return Some(cert);
                }
            }
            None
        }
        _ => None,
    }
}
