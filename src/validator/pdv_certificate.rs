//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use std::collections::BTreeMap;

use der::asn1::{BitString, ObjectIdentifier};
use der::{Decode, Encode};
use log::error;
use spki::AlgorithmIdentifierOwned;
use x509_cert::ext::{pkix::crl::CrlDistributionPoints, pkix::*};
use x509_cert::Certificate;

use const_oid::db::rfc5912::{
    ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_BASIC_CONSTRAINTS, ID_CE_CERTIFICATE_POLICIES,
    ID_CE_CRL_DISTRIBUTION_POINTS, ID_CE_EXT_KEY_USAGE, ID_CE_FRESHEST_CRL, ID_CE_ISSUER_ALT_NAME,
    ID_CE_KEY_USAGE, ID_CE_NAME_CONSTRAINTS, ID_CE_POLICY_CONSTRAINTS, ID_CE_POLICY_MAPPINGS,
    ID_PE_AUTHORITY_INFO_ACCESS, ID_PE_SUBJECT_INFO_ACCESS,
};

use crate::util::error::*;
use crate::validator::path_validator::EXTS_OF_INTEREST;
use crate::validator::pdv_extension::*;

/// [`Asn1Metadata`] is a typedef of a BTreeMap that associates arbitrary string keys with values
/// represented by the [`Asn1MetadataTypes`] enum. At present this is only used to convey filenames.
pub type Asn1Metadata = BTreeMap<String, Asn1MetadataTypes>;

/// [`MD_LOCATOR`] is used to set/get a String value to/from an [`Asn1Metadata`] object. The value
/// may represent a file name, URI or other locator for troubleshooting purposes.
pub static MD_LOCATOR: &str = "mdLocator";

/// Small assortment of types that can be used to save metadata collected during certification path
/// processing.
#[derive(PartialEq, Clone, Eq)]
pub enum Asn1MetadataTypes {
    /// Used for metadata represented as a bool
    Bool(bool),
    /// Used for metadata represented as a u32
    Number(u32),
    /// Used for metadata represented as a String
    String(String),
    /// Used for metadata represented as a `Vec<u8>`
    Buffer(Vec<u8>),
}

/// [`PDVCertificate`] is used to aggregate a binary, DER-encoded Certificate, a parsed Certificate,
/// optional metadata and parsed extensions in support of certification path development and
/// validation operations.
///
/// The parsed extensions are usually those listed in [`EXTS_OF_INTEREST`].
#[derive(Clone, Eq, PartialEq)]
pub struct PDVCertificate {
    /// Binary, encoded Certificate object
    pub encoded_cert: Vec<u8>,
    /// Decoded Certificate object
    pub decoded_cert: Certificate,
    /// Optional metadata about the certificate
    pub metadata: Option<Asn1Metadata>,
    /// Parsed extensions from the Certificate
    pub parsed_extensions: ParsedExtensions,
}

impl TryFrom<&[u8]> for PDVCertificate {
    type Error = der::Error;

    fn try_from(enc_cert: &[u8]) -> der::Result<Self> {
        let cert = Certificate::from_der(enc_cert)?;
        let mut pdv_cert = PDVCertificate {
            encoded_cert: enc_cert.to_vec(),
            decoded_cert: cert,
            metadata: None,
            parsed_extensions: Default::default(),
        };
        pdv_cert.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_cert)
    }
}

impl TryFrom<Certificate> for PDVCertificate {
    type Error = der::Error;

    fn try_from(cert: Certificate) -> der::Result<Self> {
        let enc_cert = cert.to_der()?;
        let mut pdv_cert = PDVCertificate {
            encoded_cert: enc_cert,
            decoded_cert: cert,
            metadata: None,
            parsed_extensions: Default::default(),
        };
        pdv_cert.parse_extensions(EXTS_OF_INTEREST);
        Ok(pdv_cert)
    }
}

impl ExtensionProcessing for PDVCertificate {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns a
    /// previously parsed [`PDVExtension`] instance containing the decoded extension if the extension
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

        if let Some(exts) = self.decoded_cert.tbs_certificate.extensions.as_ref() {
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
                    ID_CE_FRESHEST_CRL => {
                        add_and_return!(pe, v, oid, FreshestCrl);
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

/// [`DeferDecodeSigned`] is used to parse only the top-level structure of a signed object, without
/// parsing the details of the TBS, AlgorithmIdentifier or BIT STRING fields.
///
/// Deferred decoding is useful when verifying certificates and CRLs to avoid re-encoding the signed
/// field (and potentially encountering problems with structures that were not DER-encoded prior to
/// signing). This is intended to be used in tandem with a [`PDVCertificate`] structure that contains
/// a fully-decoded Certificate structure.
pub struct DeferDecodeSigned {
    /// tbsCertificate       TBSCertificate (or tbsCertList TBSCertList)
    pub tbs_field: Vec<u8>,
    /// signatureAlgorithm   AlgorithmIdentifier
    pub signature_algorithm: AlgorithmIdentifierOwned,
    /// signature            BIT STRING
    pub signature: BitString,
}

impl ::der::FixedTag for DeferDecodeSigned {
    const TAG: ::der::Tag = ::der::Tag::Sequence;
}

impl<'a> ::der::DecodeValue<'a> for DeferDecodeSigned {
    fn decode_value<R: ::der::Reader<'a>>(
        reader: &mut R,
        header: ::der::Header,
    ) -> ::der::Result<Self> {
        use ::der::Reader as _;
        reader.read_nested(header.length, |reader| {
            let tbs_field = reader.tlv_bytes()?;
            let signature_algorithm = reader.decode()?;
            let signature = reader.decode()?;
            Ok(Self {
                tbs_field: tbs_field.to_vec(),
                signature_algorithm,
                signature,
            })
        })
    }
}

/// `parse_cert` takes a buffer containing a binary DER encoded certificate and a locator string,
/// notionally a filename, and returns a [`PDVCertificate`] containing the parsed certificate if
/// parsing was successful.
pub fn parse_cert(buffer: &[u8], filename: &str) -> Result<PDVCertificate> {
    match Certificate::from_der(buffer) {
        Ok(cert) => {
            let mut md = Asn1Metadata::new();
            md.insert(
                MD_LOCATOR.to_string(),
                Asn1MetadataTypes::String(filename.to_string()),
            );
            let mut pdv_cert = PDVCertificate {
                encoded_cert: buffer.to_vec(),
                decoded_cert: cert,
                metadata: Some(md),
                parsed_extensions: ParsedExtensions::new(),
            };
            pdv_cert.parse_extensions(EXTS_OF_INTEREST);
            Ok(pdv_cert)
        }
        Err(e) => {
            error!("Failed to parse certificate from {}: {}", filename, e);
            Err(Error::Asn1Error(e))
        }
    }
}

/// `get_filename_from_cert_metadata` returns the string from the `MD_LOCATOR` entry in the
/// metadata or an empty string.
pub fn get_filename_from_cert_metadata(cert: &PDVCertificate) -> String {
    if let Some(md) = &cert.metadata {
        if let Some(Asn1MetadataTypes::String(filename)) = &md.get(MD_LOCATOR) {
            return filename.clone();
        }
    }
    String::new()
}
