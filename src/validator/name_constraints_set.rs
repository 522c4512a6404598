//! Structures and functions related to processing name constraints

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use url::Url;

use der::asn1::Ia5String;
use x509_cert::ext::pkix::{
    constraints::name::{GeneralSubtree, GeneralSubtrees},
    name::GeneralName,
    SubjectAltName,
};
use x509_cert::name::Name;

use crate::util::pdv_utilities::*;

/// The `NameConstraintsSet` structure is used to define inputs for path validation, i.e.,
/// initial-excluded-subtrees and initial-permitted-subtrees, as well as to track the
/// permitted_subtrees and excluded_subtrees state variables during path validation.
///
/// For each bucket, an empty vector indicates nothing has been set (i.e., no excluded names and
/// infinite permitted names) and the corresponding null flag indicates an intersection operation
/// resulted in the NULL set. Empty vectors are created by default, with the null flags used only to
/// signify an operational result.
///
/// The not_supported field collects unsupported name constraint values observed during path
/// validation.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct NameConstraintsSet {
    /// rfc822_name governs use of email addresses in SANs
    pub rfc822_name: Vec<GeneralSubtree>,
    /// rfc822_name_null is initialized to false and set to true if an intersection operation yields an empty set
    pub rfc822_name_null: bool,
    /// dns_name governs use of DNS names in SANs
    pub dns_name: Vec<GeneralSubtree>,
    /// dns_name_null is initialized to false and set to true if an intersection operation yields an empty set
    pub dns_name_null: bool,
    /// directory_name governs use of DNs in SANs and issuer and subject fields
    pub directory_name: Vec<GeneralSubtree>,
    /// directory_name_null is initialized to false and set to true if an intersection operation yields an empty set
    pub directory_name_null: bool,
    /// uniform_resource_identifier governs use of URIs in SANs
    pub uniform_resource_identifier: Vec<GeneralSubtree>,
    /// uniform_resource_identifier_null is initialized to false and set to true if an intersection operation yields an empty set
    pub uniform_resource_identifier_null: bool,
    /// not_supported accumulates unsupported name constraint values
    pub not_supported: Vec<GeneralSubtree>,
}

impl NameConstraintsSet {
    /// `calculate_union` calculates the union of self and ext and saves the result in self.
    pub fn calculate_union(&mut self, ext: &GeneralSubtrees) {
        for subtree in ext {
            let gn = &subtree.base;

            // accumulate names in the appropriate buckets. only accumulate where the bucket has
            // not been marked null, as null signifies a failed intersection.
            match gn {
                GeneralName::Rfc822Name(_rfc822) => {
                    if !self.rfc822_name_null {
                        self.rfc822_name.push(subtree.clone());
                    }
                }
                GeneralName::DnsName(_dns) => {
                    if !self.dns_name_null {
                        self.dns_name.push(subtree.clone());
                    }
                }
                GeneralName::DirectoryName(_dn) => {
                    if !self.directory_name_null {
                        self.directory_name.push(subtree.clone());
                    }
                }
                GeneralName::UniformResourceIdentifier(_uri) => {
                    if !self.uniform_resource_identifier_null {
                        self.uniform_resource_identifier.push(subtree.clone());
                    }
                }
                // not supporting name constraints for otherName, x400Address, ediPartyName,
                // iPAddress or registeredID
                _ => {
                    self.not_supported.push(subtree.clone());
                }
            }
        }
    }

    /// `calculate_intersection` calculates the intersection of self and ext and saves the result in
    /// self.
    pub fn calculate_intersection(&mut self, ext: &GeneralSubtrees) {
        self.calculate_intersection_dn(ext);
        self.calculate_intersection_rfc822(ext);
        self.calculate_intersection_dns_name(ext);
        self.calculate_intersection_uri(ext);
    }

    /// `are_any_empty` returns true if any of the supported name constraint buckets have been
    /// reduced to the NULL set.
    pub fn are_any_empty(&self) -> bool {
        self.rfc822_name_null
            || self.dns_name_null
            || self.directory_name_null
            || self.uniform_resource_identifier_null
    }

    /// `subject_within_permitted_subtrees` returns true if subject is within at least one permitted
    /// subtree known to self (or if no directory name constraints are in effect).
    pub fn subject_within_permitted_subtrees(&self, subject: &Name) -> bool {
        if subject.0.is_empty() {
            // NULL subjects get a free pass
            return true;
        }

        if self.directory_name_null {
            return false;
        }

        if self.directory_name.is_empty() {
            return true;
        }

        for gn_state in &self.directory_name {
            if let GeneralName::DirectoryName(dn_state) = &gn_state.base {
                if descended_from_dn(dn_state, subject, gn_state.minimum, gn_state.maximum) {
                    return true;
                }
            }
        }
        false
    }

    /// `subject_within_excluded_subtrees` returns true if subject is within at least one excluded
    /// subtree known to self.
    pub fn subject_within_excluded_subtrees(&self, subject: &Name) -> bool {
        if subject.0.is_empty() {
            return false;
        }

        if self.directory_name.is_empty() {
            return false;
        }

        for gn_state in &self.directory_name {
            if let GeneralName::DirectoryName(dn_state) = &gn_state.base {
                if descended_from_dn(dn_state, subject, gn_state.minimum, gn_state.maximum) {
                    return true;
                }
            }
        }
        false
    }

    /// `email_within_permitted_subtrees` returns true if the presented e-mail address, i.e., one
    /// read from an emailAddress attribute in a subject DN, is within at least one permitted
    /// rfc822 subtree known to self (or if no rfc822 constraints are in effect).
    pub fn email_within_permitted_subtrees(&self, addr: &Ia5String) -> bool {
        if self.rfc822_name_null {
            return false;
        }
        if self.rfc822_name.is_empty() {
            return true;
        }
        for gn_state in &self.rfc822_name {
            if let GeneralName::Rfc822Name(rfc822_state) = &gn_state.base {
                if descended_from_rfc822(rfc822_state, addr) {
                    return true;
                }
            }
        }
        false
    }

    /// `email_within_excluded_subtrees` returns true if the presented e-mail address is within at
    /// least one excluded rfc822 subtree known to self.
    pub fn email_within_excluded_subtrees(&self, addr: &Ia5String) -> bool {
        for gn_state in &self.rfc822_name {
            if let GeneralName::Rfc822Name(rfc822_state) = &gn_state.base {
                if descended_from_rfc822(rfc822_state, addr) {
                    return true;
                }
            }
        }
        false
    }

    /// `san_within_permitted_subtrees` returns true if every supported name in san is within at
    /// least one permitted subtree known to self.
    pub fn san_within_permitted_subtrees(&self, san: &Option<&SubjectAltName>) -> bool {
        let san = match san {
            Some(san) => san,
            None => return true,
        };

        for gn_san in san.0.iter() {
            match gn_san {
                GeneralName::DirectoryName(dn_san) => {
                    if self.directory_name_null {
                        return false;
                    }
                    if self.directory_name.is_empty() {
                        continue;
                    }
                    let mut found = false;
                    for gn_state in &self.directory_name {
                        if let GeneralName::DirectoryName(dn_state) = &gn_state.base {
                            if descended_from_dn(
                                dn_state,
                                dn_san,
                                gn_state.minimum,
                                gn_state.maximum,
                            ) {
                                found = true;
                                break;
                            }
                        }
                    }
                    if !found {
                        return false;
                    }
                }
                GeneralName::Rfc822Name(rfc822_san) => {
                    if self.rfc822_name_null {
                        return false;
                    }
                    if self.rfc822_name.is_empty() {
                        continue;
                    }
                    let mut found = false;
                    for gn_state in &self.rfc822_name {
                        if let GeneralName::Rfc822Name(rfc822_state) = &gn_state.base {
                            if descended_from_rfc822(rfc822_state, rfc822_san) {
                                found = true;
                                break;
                            }
                        }
                    }
                    if !found {
                        return false;
                    }
                }
                GeneralName::DnsName(dns_san) => {
                    if self.dns_name_null {
                        return false;
                    }
                    if self.dns_name.is_empty() {
                        continue;
                    }
                    let mut found = false;
                    for gn_state in &self.dns_name {
                        if let GeneralName::DnsName(dns_state) = &gn_state.base {
                            if descended_from_host(dns_state, dns_san.as_str(), false) {
                                found = true;
                                break;
                            }
                        }
                    }
                    if !found {
                        return false;
                    }
                }
                GeneralName::UniformResourceIdentifier(uri_san) => {
                    if self.uniform_resource_identifier_null {
                        return false;
                    }
                    if self.uniform_resource_identifier.is_empty() {
                        continue;
                    }
                    let mut found = false;
                    if let Some(host) = uri_host(uri_san.as_str()) {
                        for gn_state in &self.uniform_resource_identifier {
                            if let GeneralName::UniformResourceIdentifier(uri_state) =
                                &gn_state.base
                            {
                                if descended_from_host(uri_state, host.as_str(), true) {
                                    found = true;
                                    break;
                                }
                            }
                        }
                    }
                    if !found {
                        return false;
                    }
                }
                _ => {
                    // names of unsupported forms are unconstrained
                }
            }
        }
        true
    }

    /// `san_within_excluded_subtrees` returns true if any supported name in san is within at least
    /// one excluded subtree known to self.
    pub fn san_within_excluded_subtrees(&self, san: &Option<&SubjectAltName>) -> bool {
        let san = match san {
            Some(san) => san,
            None => return false,
        };

        for gn_san in san.0.iter() {
            match gn_san {
                GeneralName::DirectoryName(dn_san) => {
                    for gn_state in &self.directory_name {
                        if let GeneralName::DirectoryName(dn_state) = &gn_state.base {
                            if descended_from_dn(
                                dn_state,
                                dn_san,
                                gn_state.minimum,
                                gn_state.maximum,
                            ) {
                                return true;
                            }
                        }
                    }
                }
                GeneralName::Rfc822Name(rfc822_san) => {
                    for gn_state in &self.rfc822_name {
                        if let GeneralName::Rfc822Name(rfc822_state) = &gn_state.base {
                            if descended_from_rfc822(rfc822_state, rfc822_san) {
                                return true;
                            }
                        }
                    }
                }
                GeneralName::DnsName(dns_san) => {
                    for gn_state in &self.dns_name {
                        if let GeneralName::DnsName(dns_state) = &gn_state.base {
                            if descended_from_host(dns_state, dns_san.as_str(), false) {
                                return true;
                            }
                        }
                    }
                }
                GeneralName::UniformResourceIdentifier(uri_san) => {
                    if let Some(host) = uri_host(uri_san.as_str()) {
                        for gn_state in &self.uniform_resource_identifier {
                            if let GeneralName::UniformResourceIdentifier(uri_state) =
                                &gn_state.base
                            {
                                if descended_from_host(uri_state, host.as_str(), true) {
                                    return true;
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        false
    }

    //----------------------------------------------------------------------------
    // private
    //----------------------------------------------------------------------------
    fn calculate_intersection_dn(&mut self, ext: &GeneralSubtrees) {
        let new_subtrees: Vec<&GeneralSubtree> = ext
            .iter()
            .filter(|s| matches!(s.base, GeneralName::DirectoryName(_)))
            .collect();
        if new_subtrees.is_empty() || self.directory_name_null {
            return;
        }
        if self.directory_name.is_empty() {
            self.directory_name = new_subtrees.into_iter().cloned().collect();
            return;
        }

        let mut result: Vec<GeneralSubtree> = Vec::new();
        for cur in &self.directory_name {
            let cur_dn = match &cur.base {
                GeneralName::DirectoryName(dn) => dn,
                _ => continue,
            };
            for new in &new_subtrees {
                let new_dn = match &new.base {
                    GeneralName::DirectoryName(dn) => dn,
                    _ => continue,
                };
                // intersection of two prefix subtrees is the deeper one when nested, else empty
                if descended_from_dn(cur_dn, new_dn, 0, None) {
                    if !result.contains(new) {
                        result.push((*new).clone());
                    }
                } else if descended_from_dn(new_dn, cur_dn, 0, None) && !result.contains(cur) {
                    result.push(cur.clone());
                }
            }
        }
        if result.is_empty() {
            self.directory_name_null = true;
        }
        self.directory_name = result;
    }

    fn intersect_host_bucket(
        current: &mut Vec<GeneralSubtree>,
        null_flag: &mut bool,
        new_subtrees: Vec<&GeneralSubtree>,
        host_of: fn(&GeneralSubtree) -> Option<&Ia5String>,
        is_uri: bool,
    ) {
        if new_subtrees.is_empty() || *null_flag {
            return;
        }
        if current.is_empty() {
            *current = new_subtrees.into_iter().cloned().collect();
            return;
        }

        let mut result: Vec<GeneralSubtree> = Vec::new();
        for cur in current.iter() {
            let cur_host = match host_of(cur) {
                Some(h) => h,
                None => continue,
            };
            for new in &new_subtrees {
                let new_host = match host_of(new) {
                    Some(h) => h,
                    None => continue,
                };
                if descended_from_host(cur_host, new_host.as_str(), is_uri) {
                    if !result.contains(new) {
                        result.push((*new).clone());
                    }
                } else if descended_from_host(new_host, cur_host.as_str(), is_uri)
                    && !result.contains(cur)
                {
                    result.push(cur.clone());
                }
            }
        }
        if result.is_empty() {
            *null_flag = true;
        }
        *current = result;
    }

    fn calculate_intersection_rfc822(&mut self, ext: &GeneralSubtrees) {
        let new_subtrees: Vec<&GeneralSubtree> = ext
            .iter()
            .filter(|s| matches!(s.base, GeneralName::Rfc822Name(_)))
            .collect();
        Self::intersect_host_bucket(
            &mut self.rfc822_name,
            &mut self.rfc822_name_null,
            new_subtrees,
            |s| match &s.base {
                GeneralName::Rfc822Name(n) => Some(n),
                _ => None,
            },
            false,
        );
    }

    fn calculate_intersection_dns_name(&mut self, ext: &GeneralSubtrees) {
        let new_subtrees: Vec<&GeneralSubtree> = ext
            .iter()
            .filter(|s| matches!(s.base, GeneralName::DnsName(_)))
            .collect();
        Self::intersect_host_bucket(
            &mut self.dns_name,
            &mut self.dns_name_null,
            new_subtrees,
            |s| match &s.base {
                GeneralName::DnsName(n) => Some(n),
                _ => None,
            },
            false,
        );
    }

    fn calculate_intersection_uri(&mut self, ext: &GeneralSubtrees) {
        let new_subtrees: Vec<&GeneralSubtree> = ext
            .iter()
            .filter(|s| matches!(s.base, GeneralName::UniformResourceIdentifier(_)))
            .collect();
        Self::intersect_host_bucket(
            &mut self.uniform_resource_identifier,
            &mut self.uniform_resource_identifier_null,
            new_subtrees,
            |s| match &s.base {
                GeneralName::UniformResourceIdentifier(n) => Some(n),
                _ => None,
            },
            true,
        );
    }
}

/// `NameConstraintsSettings` provides a serializable representation of initial permitted or
/// excluded subtrees suitable for persisting in a [`CertificationPathSettings`](crate::CertificationPathSettings)
/// instance. Directory names are expressed per RFC 4514; other name forms are expressed as plain
/// strings.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct NameConstraintsSettings {
    /// Governs use of email addresses in SANs
    pub rfc822_name: Option<Vec<String>>,
    /// Governs use of DNS names in SANs
    pub dns_name: Option<Vec<String>>,
    /// Governs use of DNs in SANs and issuer and subject fields
    pub directory_name: Option<Vec<String>>,
    /// Governs use of URIs in SANs
    pub uniform_resource_identifier: Option<Vec<String>>,
}

fn uri_host(uri: &str) -> Option<String> {
    let url = Url::parse(uri).ok()?;
    url.host().map(|h| h.to_string())
}

fn subtree_for_general_name(gn: GeneralName) -> GeneralSubtree {
    GeneralSubtree {
        base: gn,
        minimum: 0,
        maximum: None,
    }
}

/// `name_constraints_settings_to_name_constraints_set` converts a [`NameConstraintsSettings`] into
/// a [`NameConstraintsSet`]. Values that fail to parse are dropped.
pub fn name_constraints_settings_to_name_constraints_set(
    ncs: &NameConstraintsSettings,
) -> NameConstraintsSet {
    let mut retval = NameConstraintsSet::default();
    if let Some(rfc822) = &ncs.rfc822_name {
        for v in rfc822 {
            if let Ok(ia5) = Ia5String::new(v) {
                retval
                    .rfc822_name
                    .push(subtree_for_general_name(GeneralName::Rfc822Name(ia5)));
            }
        }
    }
    if let Some(dns) = &ncs.dns_name {
        for v in dns {
            if let Ok(ia5) = Ia5String::new(v) {
                retval
                    .dns_name
                    .push(subtree_for_general_name(GeneralName::DnsName(ia5)));
            }
        }
    }
    if let Some(dns) = &ncs.directory_name {
        for v in dns {
            if let Ok(name) = Name::from_str(v) {
                retval
                    .directory_name
                    .push(subtree_for_general_name(GeneralName::DirectoryName(name)));
            }
        }
    }
    if let Some(uris) = &ncs.uniform_resource_identifier {
        for v in uris {
            if let Ok(ia5) = Ia5String::new(v) {
                retval.uniform_resource_identifier.push(subtree_for_general_name(
                    GeneralName::UniformResourceIdentifier(ia5),
                ));
            }
        }
    }
    retval
}

/// `name_constraints_set_to_name_constraints_settings` converts a [`NameConstraintsSet`] into a
/// [`NameConstraintsSettings`].
pub fn name_constraints_set_to_name_constraints_settings(
    ncs: &NameConstraintsSet,
) -> NameConstraintsSettings {
    let mut retval = NameConstraintsSettings::default();
    let mut rfc822 = vec![];
    for s in &ncs.rfc822_name {
        if let GeneralName::Rfc822Name(n) = &s.base {
            rfc822.push(n.to_string());
        }
    }
    if !rfc822.is_empty() {
        retval.rfc822_name = Some(rfc822);
    }
    let mut dns = vec![];
    for s in &ncs.dns_name {
        if let GeneralName::DnsName(n) = &s.base {
            dns.push(n.to_string());
        }
    }
    if !dns.is_empty() {
        retval.dns_name = Some(dns);
    }
    let mut dn = vec![];
    for s in &ncs.directory_name {
        if let GeneralName::DirectoryName(n) = &s.base {
            dn.push(n.to_string());
        }
    }
    if !dn.is_empty() {
        retval.directory_name = Some(dn);
    }
    let mut uris = vec![];
    for s in &ncs.uniform_resource_identifier {
        if let GeneralName::UniformResourceIdentifier(n) = &s.base {
            uris.push(n.to_string());
        }
    }
    if !uris.is_empty() {
        retval.uniform_resource_identifier = Some(uris);
    }
    retval
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dn_subtree(s: &str) -> GeneralSubtree {
        subtree_for_general_name(GeneralName::DirectoryName(Name::from_str(s).unwrap()))
    }

    #[test]
    fn union_and_membership() {
        let mut ncs = NameConstraintsSet::default();
        assert!(ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));

        ncs.calculate_union(&vec![dn_subtree("O=X,C=US")]);
        assert!(ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));
        assert!(!ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=Y,C=US").unwrap()));
        assert!(ncs.subject_within_excluded_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));
        assert!(!ncs.subject_within_excluded_subtrees(&Name::from_str("CN=A,O=Y,C=US").unwrap()));
    }

    #[test]
    fn intersection_narrows() {
        let mut ncs = NameConstraintsSet::default();
        ncs.calculate_intersection(&vec![dn_subtree("C=US")]);
        assert!(ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));

        ncs.calculate_intersection(&vec![dn_subtree("O=X,C=US")]);
        assert!(ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));
        assert!(!ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=Y,C=US").unwrap()));

        // disjoint subtree empties the bucket
        ncs.calculate_intersection(&vec![dn_subtree("O=Z,C=DE")]);
        assert!(ncs.are_any_empty());
        assert!(!ncs.subject_within_permitted_subtrees(&Name::from_str("CN=A,O=X,C=US").unwrap()));
    }

    #[test]
    fn settings_conversion_round_trip() {
        let settings = NameConstraintsSettings {
            rfc822_name: Some(vec!["example.com".to_string()]),
            dns_name: Some(vec!["example.com".to_string()]),
            directory_name: Some(vec!["O=X,C=US".to_string()]),
            uniform_resource_identifier: None,
        };
        let set = name_constraints_settings_to_name_constraints_set(&settings);
        assert_eq!(1, set.rfc822_name.len());
        assert_eq!(1, set.dns_name.len());
        assert_eq!(1, set.directory_name.len());
        let settings2 = name_constraints_set_to_name_constraints_settings(&set);
        assert_eq!(settings, settings2);
    }
}
