//! Wrappers around asn.1 encoder/decoder structures to support certification path processing

use std::collections::BTreeMap;

use der::asn1::ObjectIdentifier;
use x509_cert::ext::pkix::crl::{CrlDistributionPoints, CrlNumber, IssuingDistributionPoint};
use x509_cert::ext::pkix::*;

use crate::util::error::*;

/// The [`ExtensionProcessing`] trait provides a common means of extracting extensions from objects that
/// feature extensions, like Certificate, TrustAnchorChoice, etc. and that retain copies of the
/// decoded extension structures, like `PDVCertificate`, `PDVTrustAnchorChoice`, etc.
///
/// Extensions are primarily used during certification path development and validation. Prior to
/// performing these actions, the parse_extensions method should be used to parse the extensions
/// that will be used to build and validate certification paths. The decoded extensions will be
/// cached and accessed via the get_extension function.
pub trait ExtensionProcessing {
    /// `get_extension` takes an ObjectIdentifier that identifies an extension type and returns a
    /// previously parsed [`PDVExtension`] instance containing the decoded extension if the extension
    /// was present.
    fn get_extension(&self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extension` takes an ObjectIdentifier that identifies an extension type and returns a
    /// [`PDVExtension`] containing the decoded extension if the extension was present.
    fn parse_extension(&mut self, oid: &ObjectIdentifier) -> Result<Option<&'_ PDVExtension>>;

    /// `parse_extensions` takes a list of ObjectIdentifier values that identify extension types and
    /// parses any extensions of those types found in the wrapped object.
    fn parse_extensions(&mut self, oids: &[ObjectIdentifier]);
}

/// [`ParsedExtensions`] is a typedef of a BTreeMap that associates [`PDVExtension`] objects with
/// object identifier values. This is used to avoid parsing extensions repeatedly when performing
/// certification path processing.
pub type ParsedExtensions = BTreeMap<ObjectIdentifier, PDVExtension>;

/// [`PDVExtension`] provides a wrapper for supported extension types.
#[derive(Clone, Eq, PartialEq)]
pub enum PDVExtension {
    /// Parsed BasicConstraints extension
    BasicConstraints(BasicConstraints),
    /// Parsed SubjectKeyIdentifier extension
    SubjectKeyIdentifier(SubjectKeyIdentifier),
    /// Parsed ExtendedKeyUsage extension
    ExtendedKeyUsage(ExtendedKeyUsage),
    /// Parsed AuthorityInfoAccessSyntax extension
    AuthorityInfoAccessSyntax(AuthorityInfoAccessSyntax),
    /// Parsed SubjectInfoAccessSyntax extension
    SubjectInfoAccessSyntax(SubjectInfoAccessSyntax),
    /// Parsed KeyUsage extension
    KeyUsage(KeyUsage),
    /// Parsed SubjectAltName extension
    SubjectAltName(SubjectAltName),
    /// Parsed IssuerAltName extension
    IssuerAltName(IssuerAltName),
    /// Parsed NameConstraints extension
    NameConstraints(NameConstraints),
    /// Parsed CertificatePolicies extension
    CertificatePolicies(CertificatePolicies),
    /// Parsed PolicyMappings extension
    PolicyMappings(PolicyMappings),
    /// Parsed AuthorityKeyIdentifier extension
    AuthorityKeyIdentifier(AuthorityKeyIdentifier),
    /// Parsed PolicyConstraints extension
    PolicyConstraints(PolicyConstraints),
    /// Parsed InhibitAnyPolicy extension
    InhibitAnyPolicy(InhibitAnyPolicy),
    /// Parsed CRLDistributionPoints extension
    CrlDistributionPoints(CrlDistributionPoints),
    /// Parsed FreshestCRL extension
    FreshestCrl(FreshestCrl),
    /// Parsed IssuingDistributionPoint extension
    IssuingDistributionPoint(IssuingDistributionPoint),
    /// Parsed CRLNumber extension
    CrlNumber(CrlNumber),
    /// Parsed CRLReason extension
    CrlReason(CrlReason),
    /// Unparsed, unrecognized extension
    Unrecognized(),
}
