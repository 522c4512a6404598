//! Provides an implementation of a manually populated in-memory trust anchor store. The following
//! snip illustrates preparation and use of a [`TaSource`] object.
//!
//! ```
//! use certpath::{PkiEnvironment, TaSource};
//!
//! let mut pe = PkiEnvironment::default();
//!
//! let mut ta_source = TaSource::new();
//! // push CertFile objects onto the source then index the trust anchors
//! let _ = ta_source.initialize();
//!
//! // add ta_source to provide access to trust anchors
//! pe.add_trust_anchor_source(Box::new(ta_source));
//! ```

use std::collections::BTreeMap;
use std::str;

use log::error;

use const_oid::db::rfc5912::{ID_CE_AUTHORITY_KEY_IDENTIFIER, ID_CE_SUBJECT_KEY_IDENTIFIER};
use sha2::{Digest, Sha256};
use subtle_encoding::hex;
use x509_cert::anchor::TrustAnchorChoice;
use x509_cert::name::Name;

use crate::environment::pki_environment_traits::TrustAnchorSource;
use crate::source::cert_source::{CertFile, CertVector};
use crate::util::error::*;
use crate::util::pdv_utilities::{compare_names, name_to_string};
use crate::validator::pdv_certificate::PDVCertificate;
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};
use crate::validator::pdv_trust_anchor::{
    get_subject_public_key_info_from_trust_anchor, get_trust_anchor_name, PDVTrustAnchorChoice,
};

/// `buffer_to_hex` takes a byte array and returns a string featuring upper case ASCII hex
/// characters (without commas, spaces, or brackets).
/// ```
/// use certpath::buffer_to_hex;
/// let buf: [u8; 3] = [1, 2, 3];
/// let bufhex = buffer_to_hex(&buf);
/// assert_eq!(bufhex, "010203");
/// ```
pub fn buffer_to_hex(buffer: &[u8]) -> String {
    let hex = hex::encode_upper(buffer);
    let r = str::from_utf8(hex.as_slice());
    if let Ok(s) = r {
        s.to_string()
    } else {
        String::new()
    }
}

/// `hex_skid_from_ta` takes a trust anchor object and returns a string featuring upper case ASCII
/// hex characters.
///
/// The value represents one of the following:
/// - the value of the SubjectKeyIdentifier (SKID) extension in a Certificate option
/// - the value of a SHA256 hash of the public key from a Certificate option that lacks a SKID extension
/// - the value of the key ID field in a TrustAnchorInfo option.
pub fn hex_skid_from_ta(ta: &PDVTrustAnchorChoice) -> String {
    match &ta.decoded_ta {
        TrustAnchorChoice::Certificate(_cert) => {
            let skid = ta.get_extension(&ID_CE_SUBJECT_KEY_IDENTIFIER);
            if let Ok(Some(PDVExtension::SubjectKeyIdentifier(skid))) = skid {
                buffer_to_hex(skid.0.as_bytes())
            } else {
                let working_spki = get_subject_public_key_info_from_trust_anchor(&ta.decoded_ta);
                match working_spki.subject_public_key.as_bytes() {
                    Some(b) => buffer_to_hex(Sha256::digest(b).as_slice()),
                    None => String::new(),
                }
            }
        }
        TrustAnchorChoice::TaInfo(tai) => buffer_to_hex(tai.key_id.as_bytes()),
        _ => String::new(),
    }
}

/// `hex_skid_from_cert` takes a certificate object and returns a string featuring upper case ASCII
/// hex characters representing either the value of the SKID extension or a SHA256 hash of the
/// public key when no SKID extension is present.
pub fn hex_skid_from_cert(cert: &PDVCertificate) -> String {
    let skid = cert.get_extension(&ID_CE_SUBJECT_KEY_IDENTIFIER);
    if let Ok(Some(PDVExtension::SubjectKeyIdentifier(skid))) = skid {
        buffer_to_hex(skid.0.as_bytes())
    } else {
        let working_spki = &cert.decoded_cert.tbs_certificate.subject_public_key_info;
        match working_spki.subject_public_key.as_bytes() {
            Some(b) => buffer_to_hex(Sha256::digest(b).as_slice()),
            None => String::new(),
        }
    }
}

/// Structure containing a vector of buffers and a vector of parsed trust anchors that reference
/// items in the buffers vector. Two internal maps are used to correlate names and key identifiers
/// with indices in the trust anchor vector.
#[derive(Clone, Default)]
pub struct TaSource {
    /// List of buffers containing binary DER-encoded trust anchors
    buffers: Vec<CertFile>,

    /// Contains parsed trust anchors from the buffers field
    tas: Vec<PDVTrustAnchorChoice>,

    /// Maps TA key identifiers (as ASCII hex) onto indices in the tas field
    skid_map: BTreeMap<String, usize>,

    /// Maps TA names (as RFC 4514 strings) onto indices in the tas field
    name_map: BTreeMap<String, Vec<usize>>,
}

impl CertVector for TaSource {
    fn contains(&self, cert: &CertFile) -> bool {
        self.buffers.contains(cert)
    }
    fn push(&mut self, cert: CertFile) {
        if !self.buffers.contains(&cert) {
            self.buffers.push(cert)
        }
    }
    fn len(&self) -> usize {
        self.buffers.len()
    }
    fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

impl TaSource {
    /// instantiates a new TaSource
    pub fn new() -> TaSource {
        Default::default()
    }

    /// initialize parses the buffers presented via [`CertVector::push`] and indexes the resulting
    /// trust anchors by name and key identifier. Buffers that fail to parse are dropped.
    pub fn initialize(&mut self) -> Result<()> {
        self.tas.clear();
        self.skid_map.clear();
        self.name_map.clear();

        for cert_file in &self.buffers {
            match PDVTrustAnchorChoice::try_from(cert_file.bytes.as_slice()) {
                Ok(ta) => self.tas.push(ta),
                Err(e) => {
                    error!(
                        "Failed to parse trust anchor from {} with {}. Skipping it and continuing.",
                        cert_file.filename, e
                    );
                }
            }
        }

        for (i, ta) in self.tas.iter().enumerate() {
            let hex_skid = hex_skid_from_ta(ta);
            if !hex_skid.is_empty() {
                self.skid_map.insert(hex_skid, i);
            }
            if let Ok(name) = get_trust_anchor_name(&ta.decoded_ta) {
                self.name_map
                    .entry(name_to_string(name))
                    .or_default()
                    .push(i);
            }
        }
        Ok(())
    }

    /// Returns the number of successfully parsed trust anchors.
    pub fn num_tas(&self) -> usize {
        self.tas.len()
    }
}

impl TrustAnchorSource for TaSource {
    fn get_trust_anchors(&'_ self) -> Result<Vec<&PDVTrustAnchorChoice>> {
        Ok(self.tas.iter().collect())
    }

    fn get_trust_anchor_by_skid(&self, skid: &[u8]) -> Result<&PDVTrustAnchorChoice> {
        self.get_trust_anchor_by_hex_skid(buffer_to_hex(skid).as_str())
    }

    fn get_trust_anchor_by_hex_skid(&'_ self, hex_skid: &str) -> Result<&PDVTrustAnchorChoice> {
        if let Some(i) = self.skid_map.get(hex_skid) {
            return Ok(&self.tas[*i]);
        }
        Err(Error::NotFound)
    }

    fn get_trust_anchors_by_name(&'_ self, name: &Name) -> Result<Vec<&PDVTrustAnchorChoice>> {
        let mut retval = vec![];
        if let Some(indices) = self.name_map.get(&name_to_string(name)) {
            for i in indices {
                retval.push(&self.tas[*i]);
            }
        }
        if retval.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(retval)
    }

    fn get_trust_anchor_for_target(
        &'_ self,
        target: &'_ PDVCertificate,
    ) -> Result<&PDVTrustAnchorChoice> {
        // prefer the AKID when present, falling back to issuer name matching
        if let Ok(Some(PDVExtension::AuthorityKeyIdentifier(akid))) =
            target.get_extension(&ID_CE_AUTHORITY_KEY_IDENTIFIER)
        {
            if let Some(kid) = &akid.key_identifier {
                if let Ok(ta) = self.get_trust_anchor_by_skid(kid.as_bytes()) {
                    return Ok(ta);
                }
            }
        }

        let tas = self.get_trust_anchors_by_name(&target.decoded_cert.tbs_certificate.issuer)?;
        Ok(tas[0])
    }

    fn is_trust_anchor(&self, ta: &PDVTrustAnchorChoice) -> Result<()> {
        for cur_ta in &self.tas {
            if cur_ta.encoded_ta == ta.encoded_ta {
                return Ok(());
            }
        }
        Err(Error::NotFound)
    }

    fn is_cert_a_trust_anchor(&self, cert: &PDVCertificate) -> Result<()> {
        for cur_ta in &self.tas {
            if let TrustAnchorChoice::Certificate(ta_cert) = &cur_ta.decoded_ta {
                if compare_names(
                    &ta_cert.tbs_certificate.subject,
                    &cert.decoded_cert.tbs_certificate.subject,
                ) && ta_cert.tbs_certificate.subject_public_key_info
                    == cert.decoded_cert.tbs_certificate.subject_public_key_info
                {
                    return Ok(());
                }
            }
        }
        Err(Error::NotFound)
    }
}
