//! Provides an implementation of a manually populated in-memory certificate store. The following
//! snip illustrates preparation and use of a [`CertSource`] object.
//!
//! ```
//! use certpath::{CertSource, PkiEnvironment};
//!
//! let mut pe = PkiEnvironment::default();
//!
//! let mut cert_source = CertSource::new();
//! // push CertFile objects onto the source then index the certificates
//! let _ = cert_source.initialize();
//!
//! pe.add_certificate_source(Box::new(cert_source));
//! ```

use std::collections::BTreeMap;

use log::error;
use x509_cert::name::Name;

use crate::environment::pki_environment_traits::CertificateSource;
use crate::source::ta_source::{buffer_to_hex, hex_skid_from_cert};
use crate::util::error::*;
use crate::util::pdv_utilities::name_to_string;
use crate::validator::pdv_certificate::{parse_cert, PDVCertificate};

/// The CertFile struct associates a string, notionally containing a filename or URI, with a vector
/// of bytes, notionally containing a DER-encoded certificate or trust anchor.
#[derive(Clone, Eq)]
pub struct CertFile {
    /// String that provides a locator for the certificate in the bytes field, i.e., a filename or URI
    pub filename: String,
    /// Vector of bytes containing a binary DER-encoded certificate
    pub bytes: Vec<u8>,
}

impl PartialEq for CertFile {
    /// CertFile structures are compared on bytes only, i.e., the same certificate read from two
    /// different locations is treated as the same item.
    fn eq(&self, other: &CertFile) -> bool {
        self.bytes == other.bytes
    }
}

/// The [`CertVector`] trait provides a common means of adding buffers to a collection maintained by
/// sources that are backed by a list of [`CertFile`] objects.
pub trait CertVector {
    /// Returns true if the presented CertFile is already present in the collection.
    fn contains(&self, cert: &CertFile) -> bool;
    /// Adds the presented CertFile to the collection if not already present.
    fn push(&mut self, cert: CertFile);
    /// Returns the number of items in the collection.
    fn len(&self) -> usize;
    /// Returns true if the collection is empty.
    fn is_empty(&self) -> bool;
}

/// Structure containing a vector of buffers and a vector of parsed certificates that reference
/// items in the buffers vector. Two internal maps are used to correlate names and key identifiers
/// with indices in the certificate vector.
#[derive(Clone, Default)]
pub struct CertSource {
    /// List of buffers containing binary DER-encoded certificates
    buffers: Vec<CertFile>,

    /// Contains parsed certificates from the buffers field. Slots corresponding to buffers that
    /// could not be parsed contain None.
    certs: Vec<Option<PDVCertificate>>,

    /// Maps subject names (as RFC 4514 strings) onto indices in the certs field
    name_map: BTreeMap<String, Vec<usize>>,

    /// Maps key identifiers (as ASCII hex) onto indices in the certs field
    skid_map: BTreeMap<String, Vec<usize>>,
}

impl CertVector for CertSource {
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

impl CertSource {
    /// instantiates a new CertSource
    pub fn new() -> CertSource {
        Default::default()
    }

    /// initialize parses the buffers presented via [`CertVector::push`] and indexes the resulting
    /// certificates by subject name and key identifier. Buffers that fail to parse contribute a
    /// None entry so indices remain aligned with the buffers field.
    pub fn initialize(&mut self) -> Result<()> {
        self.certs.clear();
        self.name_map.clear();
        self.skid_map.clear();

        for cert_file in &self.buffers {
            match parse_cert(&cert_file.bytes, cert_file.filename.as_str()) {
                Ok(cert) => self.certs.push(Some(cert)),
                Err(e) => {
                    error!(
                        "Failed to parse certificate from {} with {}. Skipping it and continuing.",
                        cert_file.filename, e
                    );
                    self.certs.push(None);
                }
            }
        }

        for (i, cert) in self.certs.iter().enumerate() {
            if let Some(cert) = cert {
                let name = name_to_string(&cert.decoded_cert.tbs_certificate.subject);
                self.name_map.entry(name).or_default().push(i);
                let skid = hex_skid_from_cert(cert);
                if !skid.is_empty() {
                    self.skid_map.entry(skid).or_default().push(i);
                }
            }
        }
        Ok(())
    }

    /// Returns the number of successfully parsed certificates.
    pub fn num_certs(&self) -> usize {
        self.certs.iter().filter(|c| c.is_some()).count()
    }
}

impl CertificateSource for CertSource {
    fn get_certificates(&'_ self) -> Result<Vec<&PDVCertificate>> {
        let mut retval = vec![];
        for cert in self.certs.iter().flatten() {
            retval.push(cert);
        }
        Ok(retval)
    }

    fn get_certificates_for_skid(&self, skid: &[u8]) -> Result<Vec<&PDVCertificate>> {
        let hex_skid = buffer_to_hex(skid);
        let mut retval = vec![];
        if let Some(indices) = self.skid_map.get(&hex_skid) {
            for i in indices {
                if let Some(cert) = &self.certs[*i] {
                    retval.push(cert);
                }
            }
        }
        if retval.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(retval)
    }

    fn get_certificates_for_name(&self, name: &Name) -> Result<Vec<&PDVCertificate>> {
        let name_str = name_to_string(name);
        let mut retval = vec![];
        if let Some(indices) = self.name_map.get(&name_str) {
            for i in indices {
                if let Some(cert) = &self.certs[*i] {
                    retval.push(cert);
                }
            }
        }
        if retval.is_empty() {
            return Err(Error::NotFound);
        }
        Ok(retval)
    }
}
