//! Structures and functions related to configuring certification path processing operations

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use const_oid::db::rfc5280::ANY_POLICY;
use der::asn1::ObjectIdentifier;

use crate::validator::name_constraints_set::{
    name_constraints_set_to_name_constraints_settings,
    name_constraints_settings_to_name_constraints_set, NameConstraintsSet, NameConstraintsSettings,
};
use crate::validator::pdv_certificate::PDVCertificate;

//-----------------------------------------------------------------------------------------------
// Type definitions used in the definition of path settings
//-----------------------------------------------------------------------------------------------
/// `ObjectIdentifierSet` is a typedef for a set of ObjectIdentifier values.
pub type ObjectIdentifierSet = BTreeSet<ObjectIdentifier>;

/// `Strings` is a typedef for a vector of String values.
pub type Strings = Vec<String>;

/// `Buffers` is a typedef for a vector of `Vec<u8>` values.
pub type Buffers = Vec<Vec<u8>>;

/// `ListOfBuffers` is a typedef for a vector of vectors of `Vec<u8>` values.
pub type ListOfBuffers = Vec<Vec<Vec<u8>>>;

/// `Bools` is a typedef for a vector of bool values.
pub type Bools = Vec<bool>;

/// `CertificateChain` is a typedef for a vector of `PDVCertificate`.
pub type CertificateChain = Vec<PDVCertificate>;

/// `CertificationPathSettings` is a typedef for a `BTreeMap` that maps arbitrary string values to a
/// variant map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificationPathSettings(pub BTreeMap<String, CertificationPathProcessingTypes>);

impl CertificationPathSettings {
    /// Creates a new empty [`CertificationPathSettings`]
    pub fn new() -> Self {
        Self::default()
    }
}

//-----------------------------------------------------------------------------------------------
// A few enum and struct definitions used in the definition of path settings
//-----------------------------------------------------------------------------------------------
/// `ValidityModel` determines the time against which each certificate in a path is evaluated.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum ValidityModel {
    /// Every certificate in the path must be valid at the time of interest (RFC 5280 model).
    Standard,
    /// Each CA certificate must be valid when the certificate it issued was produced, i.e., at the
    /// notBefore time of the subordinate certificate. The target certificate is still evaluated at
    /// the time of interest.
    Chain,
}

/// The `ValidPolicyTreeNode` is used to represent nodes returned via a `PR_FINAL_VALID_POLICY_TREE`
/// entry in a [`CertificationPathResults`](crate::CertificationPathResults) instance. Each node in
/// the valid_policy_tree includes three data objects: the valid policy, a set of associated policy
/// qualifiers, and a set of one or more expected policy values. Each node is relative to a depth x.
#[derive(Clone, Debug)]
pub struct ValidPolicyTreeNode {
    /// The valid_policy is a single policy OID representing a valid policy for the path of length x.
    pub valid_policy: ObjectIdentifier,
    /// The qualifier_set is a set of policy qualifiers associated with the valid policy in certificate x.
    pub qualifier_set: Option<Vec<u8>>,
    /// The expected_policy_set contains one or more policy OIDs that would satisfy this policy in the certificate x+1.
    pub expected_policy_set: ObjectIdentifierSet,
}

/// Define a type to serve as the final value of the valid_policy_tree returned from
/// [`check_certificate_policies`](crate::check_certificate_policies).
pub type FinalValidPolicyTree = Vec<Vec<ValidPolicyTreeNode>>;

//-----------------------------------------------------------------------------------------------
// Enum used to define all path settings
//-----------------------------------------------------------------------------------------------
/// `CertificationPathProcessingTypes` is used to define a variant map with types associated with
/// performing certification path discovery and validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificationPathProcessingTypes {
    /// Represents bool values
    Bool(bool),
    /// Represents u8 values
    U8(u8),
    /// Represents u16 values
    U16(u16),
    /// Represents u32 values
    U32(u32),
    /// Represents u64 values
    U64(u64),
    /// Represents NameConstraintsSettings values
    NameConstraintsSettings(NameConstraintsSettings),
    /// Represents String values
    String(String),
    /// Represents vectors of u8 values
    Buffer(Vec<u8>),
    /// Represents vectors of Strings
    Strings(Strings),
    /// Represents vectors of bools
    Bools(Bools),
    /// Represents vectors of buffers
    Buffers(Buffers),
    /// Represents vectors of vectors of buffers
    ListOfBuffers(ListOfBuffers),
    /// Represents validity model selection
    ValidityModel(ValidityModel),
}

//-----------------------------------------------------------------------------------------------
// Types of path settings
//-----------------------------------------------------------------------------------------------
/// `PS_INITIAL_EXPLICIT_POLICY_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-explicit-policy value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_EXPLICIT_POLICY_INDICATOR: &str = "psInitialExplicitPolicyIndicator";

/// `PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-policy-mapping-inhibit value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR: &str =
    "psInitialPolicyMappingInhibitIndicator";

/// `PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-any-policy-inhibit value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// this setting is set to false.
pub static PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR: &str = "psInitialInhibitAnyPolicyIndicator";

/// `PS_INITIAL_POLICY_SET` is used to retrieve an ObjectIdentifierSet value from a [`CertificationPathSettings`]
/// object. This corresponds to the user-initial-policy-set value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. By default,
/// a set containing anyPolicy is used.
pub static PS_INITIAL_POLICY_SET: &str = "psInitialPolicySet";

/// `PS_INITIAL_PERMITTED_SUBTREES` is used to retrieve a NameConstraintsSettings value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-permitted-subtrees value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>.
pub static PS_INITIAL_PERMITTED_SUBTREES: &str = "psInitialPermittedSubtrees";

/// `PS_INITIAL_EXCLUDED_SUBTREES` is used to retrieve a NameConstraintsSettings value from a [`CertificationPathSettings`]
/// object. This corresponds to the initial-excluded-subtrees value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>.
pub static PS_INITIAL_EXCLUDED_SUBTREES: &str = "psInitialExcludedSubtrees";

/// `PS_TIME_OF_INTEREST` is used to retrieve a time value from a [`CertificationPathSettings`]
/// object. This corresponds to the current date/time value described in
/// [RFC 5280 Section 6.1.1]: <https://datatracker.ietf.org/doc/html/rfc5280#section-6.1.1>. The value
/// need not be current date/time and can be a time in the past to support retrospective validation.
/// The value is expressed as a u64 containing seconds since Unix epoch (i.e., 1970-01-01T00:00:00Z).
/// A value of zero disables validity checks.
pub static PS_TIME_OF_INTEREST: &str = "psTimeOfInterest";

/// `PS_VALIDITY_MODEL` is used to retrieve a [`ValidityModel`] value from a [`CertificationPathSettings`]
/// object. Under the default Standard model all certificates are evaluated at the time of interest;
/// under the Chain model each CA certificate is evaluated at the notBefore time of the certificate
/// it issued, allowing a long-lived chain to remain self-consistent after anchor expiry.
pub static PS_VALIDITY_MODEL: &str = "psValidityModel";

/// `PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. This corresponds to the enforceTrustAnchorConstraints value described in
/// [RFC 5937 Section 3.1]: <https://datatracker.ietf.org/doc/html/rfc5937#section-3.1>. By default,
/// this value is set to false, i.e., trust anchor constraints are not enforced.
pub static PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS: &str = "psEnforceTrustAnchorConstraints";

/// `PS_ENFORCE_TRUST_ANCHOR_VALIDITY` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. By default, this setting is set to true (per industry convention, RFC 5280 does not
/// require checking trust anchor validity). Turn this value off to refrain from checking TA validity.
pub static PS_ENFORCE_TRUST_ANCHOR_VALIDITY: &str = "psEnforceTrustAnchorValidity";

/// `PS_KEY_USAGE` is used to retrieve a u16 value from a [`CertificationPathSettings`] object.
/// The first 9 bits from the value will be considered (all other bits are ignored) when evaluating
/// the target certificate, i.e., the target certificate must have a KeyUsage extension with at
/// least the bits indicated set. When this is absent, KeyUsage values in the target certificate are
/// not considered when validating a certification path.
pub static PS_KEY_USAGE: &str = "psKeyUsage";

/// `PS_EXTENDED_KEY_USAGE` is used to retrieve an ObjectIdentifierSet from a [`CertificationPathSettings`]
/// object. There is no default. Absence of this configuration indicates EKU usage is unconstrained
/// by the caller. EKU processing for the path may still occur per the PS_EXTENDED_KEY_USAGE_PATH
/// configuration value.
pub static PS_EXTENDED_KEY_USAGE: &str = "psExtendedKeyUsage";

/// `PS_EXTENDED_KEY_USAGE_PATH` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. The default value is false. When true, certification path validation should ensure the
/// intersection of extended key usage values that appear in a certification path is not empty,
/// consistent with prevailing practices.
pub static PS_EXTENDED_KEY_USAGE_PATH: &str = "psExtendedKeyUsagePath";

/// `PS_INITIAL_PATH_LENGTH_CONSTRAINT` is used to retrieve a u8 value from a [`CertificationPathSettings`]
/// object. This value is used in concert with BasicConstraints extensions during certification
/// path processing by establishing the maximum path length that will be accepted. By default, the
/// value is set to 15, as defined by `PS_MAX_PATH_LENGTH_CONSTRAINT`.
pub static PS_INITIAL_PATH_LENGTH_CONSTRAINT: &str = "psInitialPathLengthConstraint";

/// `PS_MAX_PATH_LENGTH_CONSTRAINT` sets the maximum length path accepted by the validation and
/// building implementations.
pub static PS_MAX_PATH_LENGTH_CONSTRAINT: u8 = 15;

/// `PS_USE_VALIDATOR_FILTER_WHEN_BUILDING` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. The default value is true. When true, certification path building should employ relevant
/// certification path validation practices during path building (see RFC 4158).
pub static PS_USE_VALIDATOR_FILTER_WHEN_BUILDING: &str = "psUseValidatorFilterWhenBuilding";

/// `PS_CHECK_REVOCATION_STATUS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. The default value is true. When true, certification path validation should perform
/// revocation status checks via available means, i.e., CRLs.
pub static PS_CHECK_REVOCATION_STATUS: &str = "psCheckRevocationStatus";

/// `PS_CHECK_CRLS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. The default value is true. When true, certification path validation should perform
/// revocation status checks via available CRLs.
pub static PS_CHECK_CRLS: &str = "psCheckCrls";

/// `PS_USE_DELTAS` is used to retrieve a boolean value from a [`CertificationPathSettings`]
/// object. The default value is true. When true, delta CRLs are located and processed alongside
/// complete CRLs when determining revocation status.
pub static PS_USE_DELTAS: &str = "psUseDeltas";

/// `PS_EXCLUDED_CERTIFICATES` is used to retrieve a Buffers value from a [`CertificationPathSettings`]
/// object containing encoded certificates that must not appear in any certification path produced
/// by the path builder.
pub static PS_EXCLUDED_CERTIFICATES: &str = "psExcludedCertificates";

/// `PS_CERTS_UNDER_REVOCATION_CHECK` is used to retrieve a Buffers value from a [`CertificationPathSettings`]
/// object containing encoded certificates whose revocation status determination is in progress.
/// Nested path validation operations, i.e., when validating a CRL signer's certification path,
/// disable revocation checking for these certificates to break recursion cycles. This value is
/// threaded through cloned settings objects rather than shared state.
pub static PS_CERTS_UNDER_REVOCATION_CHECK: &str = "psCertsUnderRevocationCheck";

/// `PS_REQUIRE_TA_STORE` is used to indicate that the validator should require a trust anchor store
/// to affirm a given trust anchor is actually a trust anchor.
pub static PS_REQUIRE_TA_STORE: &str = "psRequireTaStore";

//-----------------------------------------------------------------------------------------------
// Getters/setters for settings
//-----------------------------------------------------------------------------------------------
macro_rules! cps_gets_and_sets_with_default {
    ($key:ident, $getter:ident, $setter:ident, $t:ty, $variant:ident, $default:expr) => {
        #[doc = concat!("`", stringify!($getter), "` is used to retrieve the `", stringify!($key), "` item from a [`CertificationPathSettings`] instance")]
        pub fn $getter(cps: &CertificationPathSettings) -> $t {
            if let Some(CertificationPathProcessingTypes::$variant(v)) = cps.0.get($key) {
                return v.clone();
            }
            $default
        }
        #[doc = concat!("`", stringify!($setter), "` is used to set the `", stringify!($key), "` item in a [`CertificationPathSettings`] instance")]
        pub fn $setter(cps: &mut CertificationPathSettings, v: $t) {
            cps.0
                .insert($key.to_string(), CertificationPathProcessingTypes::$variant(v));
        }
    };
}

macro_rules! cps_gets_and_sets_optional {
    ($key:ident, $getter:ident, $setter:ident, $t:ty, $variant:ident) => {
        #[doc = concat!("`", stringify!($getter), "` is used to retrieve the `", stringify!($key), "` item from a [`CertificationPathSettings`] instance, if present")]
        pub fn $getter(cps: &CertificationPathSettings) -> Option<$t> {
            if let Some(CertificationPathProcessingTypes::$variant(v)) = cps.0.get($key) {
                return Some(v.clone());
            }
            None
        }
        #[doc = concat!("`", stringify!($setter), "` is used to set the `", stringify!($key), "` item in a [`CertificationPathSettings`] instance")]
        pub fn $setter(cps: &mut CertificationPathSettings, v: $t) {
            cps.0
                .insert($key.to_string(), CertificationPathProcessingTypes::$variant(v));
        }
    };
}

cps_gets_and_sets_with_default!(
    PS_INITIAL_EXPLICIT_POLICY_INDICATOR,
    get_initial_explicit_policy_indicator,
    set_initial_explicit_policy_indicator,
    bool,
    Bool,
    false
);
cps_gets_and_sets_with_default!(
    PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR,
    get_initial_policy_mapping_inhibit_indicator,
    set_initial_policy_mapping_inhibit_indicator,
    bool,
    Bool,
    false
);
cps_gets_and_sets_with_default!(
    PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR,
    get_initial_inhibit_any_policy_indicator,
    set_initial_inhibit_any_policy_indicator,
    bool,
    Bool,
    false
);
cps_gets_and_sets_with_default!(
    PS_TIME_OF_INTEREST,
    get_time_of_interest,
    set_time_of_interest,
    u64,
    U64,
    0
);
cps_gets_and_sets_with_default!(
    PS_VALIDITY_MODEL,
    get_validity_model,
    set_validity_model,
    ValidityModel,
    ValidityModel,
    ValidityModel::Standard
);
cps_gets_and_sets_with_default!(
    PS_ENFORCE_TRUST_ANCHOR_CONSTRAINTS,
    get_enforce_trust_anchor_constraints,
    set_enforce_trust_anchor_constraints,
    bool,
    Bool,
    false
);
cps_gets_and_sets_with_default!(
    PS_ENFORCE_TRUST_ANCHOR_VALIDITY,
    get_enforce_trust_anchor_validity,
    set_enforce_trust_anchor_validity,
    bool,
    Bool,
    true
);
cps_gets_and_sets_with_default!(
    PS_EXTENDED_KEY_USAGE_PATH,
    get_extended_key_usage_path,
    set_extended_key_usage_path,
    bool,
    Bool,
    false
);
cps_gets_and_sets_with_default!(
    PS_INITIAL_PATH_LENGTH_CONSTRAINT,
    get_initial_path_length_constraint,
    set_initial_path_length_constraint,
    u8,
    U8,
    PS_MAX_PATH_LENGTH_CONSTRAINT
);
cps_gets_and_sets_with_default!(
    PS_USE_VALIDATOR_FILTER_WHEN_BUILDING,
    get_use_validator_filter_when_building,
    set_use_validator_filter_when_building,
    bool,
    Bool,
    true
);
cps_gets_and_sets_with_default!(
    PS_CHECK_REVOCATION_STATUS,
    get_check_revocation_status,
    set_check_revocation_status,
    bool,
    Bool,
    true
);
cps_gets_and_sets_with_default!(
    PS_CHECK_CRLS,
    get_check_crls,
    set_check_crls,
    bool,
    Bool,
    true
);
cps_gets_and_sets_with_default!(PS_USE_DELTAS, get_use_deltas, set_use_deltas, bool, Bool, true);
cps_gets_and_sets_with_default!(
    PS_EXCLUDED_CERTIFICATES,
    get_excluded_certificates,
    set_excluded_certificates,
    Buffers,
    Buffers,
    Buffers::new()
);
cps_gets_and_sets_with_default!(
    PS_CERTS_UNDER_REVOCATION_CHECK,
    get_certs_under_revocation_check,
    set_certs_under_revocation_check,
    Buffers,
    Buffers,
    Buffers::new()
);
cps_gets_and_sets_with_default!(
    PS_REQUIRE_TA_STORE,
    get_require_ta_store,
    set_require_ta_store,
    bool,
    Bool,
    false
);
cps_gets_and_sets_optional!(
    PS_KEY_USAGE,
    get_target_key_usage,
    set_target_key_usage,
    u16,
    U16
);
cps_gets_and_sets_optional!(
    PS_INITIAL_PERMITTED_SUBTREES,
    get_initial_permitted_subtrees,
    set_initial_permitted_subtrees,
    NameConstraintsSettings,
    NameConstraintsSettings
);
cps_gets_and_sets_optional!(
    PS_INITIAL_EXCLUDED_SUBTREES,
    get_initial_excluded_subtrees,
    set_initial_excluded_subtrees,
    NameConstraintsSettings,
    NameConstraintsSettings
);

/// `get_initial_policy_set` is used to retrieve the `PS_INITIAL_POLICY_SET` item from a
/// [`CertificationPathSettings`] instance. A set containing anyPolicy is returned by default.
pub fn get_initial_policy_set(cps: &CertificationPathSettings) -> Strings {
    if let Some(CertificationPathProcessingTypes::Strings(v)) = cps.0.get(PS_INITIAL_POLICY_SET) {
        return v.clone();
    }
    vec![ANY_POLICY.to_string()]
}

/// `set_initial_policy_set` is used to set the `PS_INITIAL_POLICY_SET` item in a
/// [`CertificationPathSettings`] instance.
pub fn set_initial_policy_set(cps: &mut CertificationPathSettings, v: Strings) {
    cps.0.insert(
        PS_INITIAL_POLICY_SET.to_string(),
        CertificationPathProcessingTypes::Strings(v),
    );
}

/// `get_initial_policy_set_as_oid_set` is used to retrieve the `PS_INITIAL_POLICY_SET` item from a
/// [`CertificationPathSettings`] instance as an ObjectIdentifierSet instead of a Strings object.
pub fn get_initial_policy_set_as_oid_set(cps: &CertificationPathSettings) -> ObjectIdentifierSet {
    let strs = get_initial_policy_set(cps);
    let mut bts = BTreeSet::new();
    for s in strs {
        if let Ok(oid) = ObjectIdentifier::from_str(s.as_str()) {
            bts.insert(oid);
        }
    }
    bts
}

/// `set_initial_policy_set_from_oid_set` is used to set the `PS_INITIAL_POLICY_SET` item in a
/// [`CertificationPathSettings`] instance given an ObjectIdentifierSet instead of a Strings object.
pub fn set_initial_policy_set_from_oid_set(
    cps: &mut CertificationPathSettings,
    v: ObjectIdentifierSet,
) {
    let mut s = Strings::new();
    for o in v {
        s.push(o.to_string());
    }
    set_initial_policy_set(cps, s);
}

/// `get_extended_key_usage_as_oid_set` is used to retrieve the `PS_EXTENDED_KEY_USAGE` item from a
/// [`CertificationPathSettings`] instance as an ObjectIdentifierSet, if present.
pub fn get_extended_key_usage_as_oid_set(
    cps: &CertificationPathSettings,
) -> Option<ObjectIdentifierSet> {
    if let Some(CertificationPathProcessingTypes::Strings(v)) = cps.0.get(PS_EXTENDED_KEY_USAGE) {
        let mut bts = BTreeSet::new();
        for s in v {
            if let Ok(oid) = ObjectIdentifier::from_str(s.as_str()) {
                bts.insert(oid);
            }
        }
        return Some(bts);
    }
    None
}

/// `set_extended_key_usage_from_oid_set` is used to set the `PS_EXTENDED_KEY_USAGE` item in a
/// [`CertificationPathSettings`] instance given an ObjectIdentifierSet.
pub fn set_extended_key_usage_from_oid_set(
    cps: &mut CertificationPathSettings,
    v: ObjectIdentifierSet,
) {
    let mut s = Strings::new();
    for o in v {
        s.push(o.to_string());
    }
    cps.0.insert(
        PS_EXTENDED_KEY_USAGE.to_string(),
        CertificationPathProcessingTypes::Strings(s),
    );
}

/// `get_initial_permitted_subtrees_as_set` is used to retrieve the `PS_INITIAL_PERMITTED_SUBTREES`
/// item from a [`CertificationPathSettings`] instance as a [`NameConstraintsSet`], if present.
pub fn get_initial_permitted_subtrees_as_set(
    cps: &CertificationPathSettings,
) -> Option<NameConstraintsSet> {
    get_initial_permitted_subtrees(cps)
        .map(|ncs| name_constraints_settings_to_name_constraints_set(&ncs))
}

/// `set_initial_permitted_subtrees_from_set` is used to set the `PS_INITIAL_PERMITTED_SUBTREES`
/// item in a [`CertificationPathSettings`] instance from a [`NameConstraintsSet`].
pub fn set_initial_permitted_subtrees_from_set(
    cps: &mut CertificationPathSettings,
    ncs: &NameConstraintsSet,
) {
    set_initial_permitted_subtrees(cps, name_constraints_set_to_name_constraints_settings(ncs));
}

/// `get_initial_excluded_subtrees_as_set` is used to retrieve the `PS_INITIAL_EXCLUDED_SUBTREES`
/// item from a [`CertificationPathSettings`] instance as a [`NameConstraintsSet`], if present.
pub fn get_initial_excluded_subtrees_as_set(
    cps: &CertificationPathSettings,
) -> Option<NameConstraintsSet> {
    get_initial_excluded_subtrees(cps)
        .map(|ncs| name_constraints_settings_to_name_constraints_set(&ncs))
}

/// `set_initial_excluded_subtrees_from_set` is used to set the `PS_INITIAL_EXCLUDED_SUBTREES`
/// item in a [`CertificationPathSettings`] instance from a [`NameConstraintsSet`].
pub fn set_initial_excluded_subtrees_from_set(
    cps: &mut CertificationPathSettings,
    ncs: &NameConstraintsSet,
) {
    set_initial_excluded_subtrees(cps, name_constraints_set_to_name_constraints_settings(ncs));
}
