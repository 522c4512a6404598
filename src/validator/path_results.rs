//! Structures and functions related to results from certification path processing operations

use std::collections::{BTreeMap, BTreeSet};

use der::asn1::ObjectIdentifier;

use crate::util::error::{Error, PathValidationStatus};
use crate::validator::path_settings::{FinalValidPolicyTree, ListOfBuffers, ObjectIdentifierSet};

/// `CertificationPathResultsTypes` is used to define a variant map with types associated with
/// collecting results from certification path discovery and validation operations.
#[derive(Clone)]
pub enum CertificationPathResultsTypes {
    /// Represents ObjectIdentifierSet values
    ObjectIdentifierSet(ObjectIdentifierSet),
    /// Represents vectors of bools
    Bools(Vec<bool>),
    /// Represents vectors of buffers
    Buffers(Vec<Vec<u8>>),
    /// Represents vectors of vectors of buffers
    ListOfBuffers(ListOfBuffers),
    /// Represents FinalValidPolicyTree values
    FinalValidPolicyTree(FinalValidPolicyTree),
    /// Represents a validation result
    PathValidationStatus(PathValidationStatus),
    /// Represents an index into a certification path
    Index(usize),
    /// Represents an error
    Error(Error),
}

/// `CertificationPathResults` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Clone, Default)]
pub struct CertificationPathResults(pub BTreeMap<&'static str, CertificationPathResultsTypes>);

impl CertificationPathResults {
    /// Creates a new empty [`CertificationPathResults`]
    pub fn new() -> Self {
        Self(Default::default())
    }
}

/// `PR_PROCESSED_EXTENSIONS` is used to retrieve an ObjectIdentifierSet value, i.e., a BTreeSet of
/// ObjectIdentifier, from a [`CertificationPathResults`] object. This list is populated as
/// extensions are processed then used to check for unprocessed critical extensions.
pub static PR_PROCESSED_EXTENSIONS: &str = "cprProcessedExtensions";

/// `PR_FINAL_VALID_POLICY_TREE` is used to retrieve a FinalValidPolicyTree value from a
/// [`CertificationPathResults`] object.
pub static PR_FINAL_VALID_POLICY_TREE: &str = "cprValidPolicyTree";

/// `PR_VALIDATION_STATUS` is used to retrieve a status code indicating validation result.
pub static PR_VALIDATION_STATUS: &str = "cprValidationStatus";

/// `PR_FAILING_CERT_INDEX` is used to retrieve the index of the certificate at which validation
/// failed. Indices are zero-based counting from the target certificate, i.e., the target is index
/// zero and the intermediate CA certificate closest to the trust anchor has the highest index.
pub static PR_FAILING_CERT_INDEX: &str = "cprFailingCertIndex";

/// `PR_CRL` is used to retrieve CRL(s) used for each item in a certification path.
pub static PR_CRL: &str = "cprCrl";

/// `PR_FAILED_CRLS` is used to retrieve CRLs that did not contribute to determination of status.
pub static PR_FAILED_CRLS: &str = "cprFailedCrls";

/// `PR_CRL_ENTRY` is used to retrieve CRL entries found for each item in a certification path.
pub static PR_CRL_ENTRY: &str = "cprCrlEntry";

//-----------------------------------------------------------------------------------------------
// Getters/setters for results
//-----------------------------------------------------------------------------------------------
/// `get_processed_extensions` is used to retrieve the `PR_PROCESSED_EXTENSIONS` item from a
/// [`CertificationPathResults`] instance. An empty set is returned when absent.
pub fn get_processed_extensions(cpr: &CertificationPathResults) -> ObjectIdentifierSet {
    if let Some(CertificationPathResultsTypes::ObjectIdentifierSet(v)) =
        cpr.0.get(PR_PROCESSED_EXTENSIONS)
    {
        return v.clone();
    }
    BTreeSet::new()
}

/// `set_processed_extensions` is used to set the `PR_PROCESSED_EXTENSIONS` item in a
/// [`CertificationPathResults`] instance.
pub fn set_processed_extensions(cpr: &mut CertificationPathResults, v: ObjectIdentifierSet) {
    cpr.0.insert(
        PR_PROCESSED_EXTENSIONS,
        CertificationPathResultsTypes::ObjectIdentifierSet(v),
    );
}

/// `add_processed_extension` retrieves (or adds then retrieves) the `PR_PROCESSED_EXTENSIONS` entry
/// from a [`CertificationPathResults`] instance then adds the presented oid if not already present.
pub fn add_processed_extension(cpr: &mut CertificationPathResults, oid: ObjectIdentifier) {
    let mut oids = get_processed_extensions(cpr);
    if !oids.contains(&oid) {
        oids.insert(oid);
        set_processed_extensions(cpr, oids);
    }
}

/// `get_final_valid_policy_tree` is used to retrieve the `PR_FINAL_VALID_POLICY_TREE` item from a
/// [`CertificationPathResults`] instance, if present.
pub fn get_final_valid_policy_tree(
    cpr: &CertificationPathResults,
) -> Option<FinalValidPolicyTree> {
    if let Some(CertificationPathResultsTypes::FinalValidPolicyTree(v)) =
        cpr.0.get(PR_FINAL_VALID_POLICY_TREE)
    {
        return Some(v.clone());
    }
    None
}

/// `set_final_valid_policy_tree` is used to set the `PR_FINAL_VALID_POLICY_TREE` item in a
/// [`CertificationPathResults`] instance.
pub fn set_final_valid_policy_tree(cpr: &mut CertificationPathResults, v: FinalValidPolicyTree) {
    cpr.0.insert(
        PR_FINAL_VALID_POLICY_TREE,
        CertificationPathResultsTypes::FinalValidPolicyTree(v),
    );
}

/// `get_validation_status` is used to retrieve the `PR_VALIDATION_STATUS` item from a
/// [`CertificationPathResults`] instance, if present.
pub fn get_validation_status(cpr: &CertificationPathResults) -> Option<PathValidationStatus> {
    if let Some(CertificationPathResultsTypes::PathValidationStatus(v)) =
        cpr.0.get(PR_VALIDATION_STATUS)
    {
        return Some(*v);
    }
    None
}

/// `set_validation_status` is used to set the `PR_VALIDATION_STATUS` item in a
/// [`CertificationPathResults`] instance.
pub fn set_validation_status(cpr: &mut CertificationPathResults, v: PathValidationStatus) {
    cpr.0.insert(
        PR_VALIDATION_STATUS,
        CertificationPathResultsTypes::PathValidationStatus(v),
    );
}

/// `get_failing_cert_index` is used to retrieve the `PR_FAILING_CERT_INDEX` item from a
/// [`CertificationPathResults`] instance, if present.
pub fn get_failing_cert_index(cpr: &CertificationPathResults) -> Option<usize> {
    if let Some(CertificationPathResultsTypes::Index(v)) = cpr.0.get(PR_FAILING_CERT_INDEX) {
        return Some(*v);
    }
    None
}

/// `set_failing_cert_index` is used to set the `PR_FAILING_CERT_INDEX` item in a
/// [`CertificationPathResults`] instance. The index is zero-based counting from the target.
pub fn set_failing_cert_index(cpr: &mut CertificationPathResults, v: usize) {
    cpr.0
        .insert(PR_FAILING_CERT_INDEX, CertificationPathResultsTypes::Index(v));
}

macro_rules! cpr_list_of_buffers_gets_sets_adds {
    ($key:ident, $getter:ident, $setter:ident, $adder:ident) => {
        #[doc = concat!("`", stringify!($getter), "` is used to retrieve the `", stringify!($key), "` item from a [`CertificationPathResults`] instance, if present")]
        pub fn $getter(cpr: &CertificationPathResults) -> Option<ListOfBuffers> {
            if let Some(CertificationPathResultsTypes::ListOfBuffers(v)) = cpr.0.get($key) {
                return Some(v.clone());
            }
            None
        }
        #[doc = concat!("`", stringify!($setter), "` is used to set the `", stringify!($key), "` item in a [`CertificationPathResults`] instance")]
        pub fn $setter(cpr: &mut CertificationPathResults, v: ListOfBuffers) {
            cpr.0
                .insert($key, CertificationPathResultsTypes::ListOfBuffers(v));
        }
        #[doc = concat!("`", stringify!($adder), "` adds a buffer to the `", stringify!($key), "` list at the given certification path position")]
        pub fn $adder(cpr: &mut CertificationPathResults, buf: &[u8], pos: usize) {
            let mut v: ListOfBuffers = if let Some(v) = $getter(cpr) {
                v
            } else {
                return;
            };
            if v.len() > pos {
                v[pos].push(buf.to_vec());
            }
            $setter(cpr, v);
        }
    };
}

cpr_list_of_buffers_gets_sets_adds!(PR_CRL, get_crl_results, set_crl_results, add_crl);
cpr_list_of_buffers_gets_sets_adds!(
    PR_FAILED_CRLS,
    get_failed_crls,
    set_failed_crls,
    add_failed_crl
);
cpr_list_of_buffers_gets_sets_adds!(PR_CRL_ENTRY, get_crl_entries, set_crl_entries, add_crl_entry);

/// `prepare_revocation_results` takes a [`CertificationPathResults`] and the number of certificates
/// in a certification path (not counting the trust anchor). It prepares results variables set to
/// appropriate capacity to receive revocation-related results.
pub fn prepare_revocation_results(
    cpr: &mut CertificationPathResults,
    num_certs: usize,
) -> crate::Result<()> {
    set_crl_results(cpr, vec![vec![]; num_certs]);
    set_failed_crls(cpr, vec![vec![]; num_certs]);
    set_crl_entries(cpr, vec![vec![]; num_certs]);
    Ok(())
}

#[test]
fn check_prepared_results() {
    let mut cpr = CertificationPathResults::default();
    assert!(prepare_revocation_results(&mut cpr, 4).is_ok());
    assert_eq!(4, get_crl_results(&cpr).unwrap().len());
    assert_eq!(4, get_failed_crls(&cpr).unwrap().len());
    assert_eq!(4, get_crl_entries(&cpr).unwrap().len());

    add_crl(&mut cpr, &[0x30, 0x00], 2);
    assert_eq!(1, get_crl_results(&cpr).unwrap()[2].len());
    add_crl(&mut cpr, &[0x30, 0x00], 7);
    assert_eq!(4, get_crl_results(&cpr).unwrap().len());

    let mut cpr = CertificationPathResults::default();
    assert!(prepare_revocation_results(&mut cpr, 0).is_ok());
    assert_eq!(0, get_crl_results(&cpr).unwrap().len());
    assert_eq!(0, get_failed_crls(&cpr).unwrap().len());
    assert_eq!(0, get_crl_entries(&cpr).unwrap().len());
}
