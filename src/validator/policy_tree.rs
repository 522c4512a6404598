//! Policy tree-based certificate policy processing per RFC 5280 sections 6.1.2 through 6.1.5

use std::cell::RefCell;
use std::collections::BTreeMap;

use const_oid::db::rfc5280::ANY_POLICY;
use const_oid::db::rfc5912::{
    ID_CE_CERTIFICATE_POLICIES, ID_CE_INHIBIT_ANY_POLICY, ID_CE_POLICY_CONSTRAINTS,
    ID_CE_POLICY_MAPPINGS,
};
use der::asn1::ObjectIdentifier;
use der::Encode;

use crate::environment::pki_environment::PkiEnvironment;
use crate::util::error::*;
use crate::util::pdv_utilities::{is_self_issued, log_error_for_ca};
use crate::validator::cert_path::CertificationPath;
use crate::validator::path_results::*;
use crate::validator::path_settings::*;
use crate::validator::pdv_extension::{ExtensionProcessing, PDVExtension};
use crate::validator::policy_utilities::*;

/// `prune_childless_nodes` deletes nodes without children from rows zero through max_depth of the
/// valid_policy_tree, working from the deepest affected row upward so that a deletion can cascade
/// into shallower rows. Deleted nodes are detached from their parents' children lists.
fn prune_childless_nodes(
    pm: &PolicyPool,
    valid_policy_tree: &mut [PolicyTreeRow],
    max_depth: usize,
) {
    for depth in (0..=max_depth.min(valid_policy_tree.len() - 1)).rev() {
        let mut removed = vec![];
        valid_policy_tree[depth].retain(|x| {
            if num_kids_is_zero(pm, *x) {
                removed.push(*x);
                false
            } else {
                true
            }
        });
        for r in removed {
            if let Some(parent_index) = pm[r].parent {
                pm[parent_index].children.borrow_mut().retain(|c| *c != r);
            }
        }
    }
}

/// `remove_row_node` removes the node at node_index from the given row and detaches it from its
/// parent's children list.
fn remove_row_node(pm: &PolicyPool, row: &mut PolicyTreeRow, node_index: usize) {
    row.retain(|x| *x != node_index);
    if let Some(parent_index) = pm[node_index].parent {
        pm[parent_index]
            .children
            .borrow_mut()
            .retain(|c| *c != node_index);
    }
}

/// `check_certificate_policies` implements certificate policy processing per RFC 5280.
///
/// It references the following certificate extensions:
/// - ID_CE_CERTIFICATE_POLICIES,
/// - ID_CE_POLICY_MAPPINGS,
/// - ID_CE_POLICY_CONSTRAINTS,
/// - ID_CE_INHIBIT_ANY_POLICY
///
/// It references the following values in the [`CertificationPathSettings`] parameter:
/// - PS_INITIAL_EXPLICIT_POLICY_INDICATOR,
/// - PS_INITIAL_POLICY_MAPPING_INHIBIT_INDICATOR,
/// - PS_INITIAL_INHIBIT_ANY_POLICY_INDICATOR,
/// - PS_INITIAL_POLICY_SET.
///
/// It contributes to the PR_PROCESSED_EXTENSIONS value and PR_FINAL_VALID_POLICY_TREE value of the
/// [`CertificationPathResults`] instance.
///
/// This function does not process certificate policy information conveyed in a trust anchor and
/// assumes that if such processing is desired the information has already been factored into the
/// [`CertificationPathSettings`] as per RFC 5937 and as provided for in
/// [`enforce_trust_anchor_constraints`](crate::enforce_trust_anchor_constraints).
pub fn check_certificate_policies(
    _pe: &PkiEnvironment,
    cps: &CertificationPathSettings,
    cp: &mut CertificationPath,
    cpr: &mut CertificationPathResults,
) -> Result<()> {
    add_processed_extension(cpr, ID_CE_CERTIFICATE_POLICIES);
    add_processed_extension(cpr, ID_CE_INHIBIT_ANY_POLICY);
    add_processed_extension(cpr, ID_CE_POLICY_CONSTRAINTS);
    add_processed_extension(cpr, ID_CE_POLICY_MAPPINGS);

    let certs_in_cert_path: u32 = (cp.intermediates.len() + 1) as u32;

    // vector to own nodes that appear in the valid_policy_tree
    let pool = RefCell::new(PolicyPool::new());
    let pm = &mut pool.borrow_mut();

    // Harvest the relevant settings from the path settings object (RFC 5280 6.1.1 c, e, f and g)
    let initial_policy_set: ObjectIdentifierSet = get_initial_policy_set_as_oid_set(cps);
    let initial_policy_mapping_inhibit_indicator: bool =
        get_initial_policy_mapping_inhibit_indicator(cps);
    let initial_explicit_policy_indicator: bool = get_initial_explicit_policy_indicator(cps);
    let initial_inhibit_any_policy_indicator: bool = get_initial_inhibit_any_policy_indicator(cps);

    // Initialize state variables (RFC 5280 6.1.2 a, d, e, and f)
    let mut valid_policy_tree = Vec::<PolicyTreeRow>::new();
    let mut explicit_policy: u32 = if initial_explicit_policy_indicator {
        0
    } else {
        certs_in_cert_path + 1
    };
    let mut inhibit_any_policy: u32 = if initial_inhibit_any_policy_indicator {
        0
    } else {
        certs_in_cert_path + 1
    };
    let mut policy_mapping: u32 = if initial_policy_mapping_inhibit_indicator {
        0
    } else {
        certs_in_cert_path + 1
    };

    // Create first node per 6.1.2.a:
    //      The initial value of the valid_policy_tree is a single node with
    //            valid_policy anyPolicy, an empty qualifier_set, and an
    //            expected_policy_set with the single value anyPolicy.  This node is
    //            considered to be at depth zero.
    let root_index = make_new_policy_node_add_to_pool(
        pm,
        ANY_POLICY,
        &None,
        ObjectIdentifierSet::from([ANY_POLICY]),
        0,
        &None,
    );
    valid_policy_tree.push(PolicyTreeRow::from([root_index]));
    let mut valid_policy_tree_is_null = false;

    // for convenience, combine target into array with the intermediate CA certs
    let mut v = cp.intermediates.clone();
    v.push(cp.target.clone());

    for (pos, ca_cert) in v.iter().enumerate() {
        // save pos in variable named i starting from 1 (to account for root node not being in this
        // loop) to make reading spec language easier
        let i = pos + 1;

        // has_any_policy is used to signify when anyPolicy appears in a cert. ap_q captures the
        // encoded qualifiers, if present.
        let mut has_any_policy = false;
        let mut ap_q: Option<Vec<u8>> = None;

        valid_policy_tree.push(PolicyTreeRow::new());

        if !valid_policy_tree_is_null {
            if let Some(PDVExtension::CertificatePolicies(cps_from_ext)) =
                ca_cert.get_extension(&ID_CE_CERTIFICATE_POLICIES)?
            {
                //(d)  If the certificate policies extension is present in the
                //	certificate and the valid_policy_tree is not NULL, process
                //	the policy information by performing the following steps in
                //	order:
                for cp_info in &cps_from_ext.0 {
                    if ANY_POLICY != cp_info.policy_identifier {
                        //(1)  For each policy P not equal to anyPolicy in the
                        //	certificate policies extension, let P-OID denote the OID
                        //	for policy P and P-Q denote the qualifier set for policy
                        //	P.  Perform the following steps in order:
                        let p_oid = &cp_info.policy_identifier;
                        let p_q: Option<Vec<u8>> = match &cp_info.policy_qualifiers {
                            // ignore qualifiers that don't encode
                            Some(q) => q.to_der().ok(),
                            None => None,
                        };

                        // for i and ii, save the indices of any parents and add the nodes below to
                        // avoid a mutable borrow inside the loop for step i.

                        //(i)   For each node of depth i-1 in the valid_policy_tree
                        //		where P-OID is in the expected_policy_set, create a
                        //		child node as follows: set the valid_policy to P-OID,
                        //		set the qualifier_set to P-Q, and set the
                        //		expected_policy_set to {P-OID}.
                        let mut prospective_parents = PolicyTreeRow::new();
                        let mut match_found = false;
                        for ps_index in &valid_policy_tree[i - 1] {
                            let ps = &pm[*ps_index];
                            if ps.expected_policy_set.contains(p_oid) {
                                prospective_parents.push(*ps_index);
                                match_found = true;
                            }
                        }

                        //(ii)  If there was no match in step (i) and the
                        //		valid_policy_tree includes a node of depth i-1 with
                        //		the valid_policy anyPolicy, generate a child node with
                        //		the following values: set the valid_policy to P-OID,
                        //		set the qualifier_set to P-Q, and set the
                        //		expected_policy_set to {P-OID}.
                        if !match_found {
                            if let Some(parent_index) = policy_tree_row_contains_policy(
                                pm,
                                &valid_policy_tree[i - 1],
                                ANY_POLICY,
                            ) {
                                prospective_parents.push(parent_index);
                            }
                        }

                        //add the items as per i and ii, if there is anything to add
                        for p in prospective_parents {
                            let new_node_index = make_new_policy_node_add_to_pool(
                                pm,
                                *p_oid,
                                &p_q,
                                ObjectIdentifierSet::from([*p_oid]),
                                i as u8,
                                &Some(p),
                            );
                            let parent = &pm[p];
                            add_child_if_not_present(pm, &parent.children, new_node_index);
                            valid_policy_tree[i].push(new_node_index);
                        }
                    } else {
                        //save indication that anyPolicy was observed along with qualifiers, if
                        //present, for use when processing step (2) below.
                        has_any_policy = true;
                        ap_q = match &cp_info.policy_qualifiers {
                            Some(q) => q.to_der().ok(),
                            None => None,
                        };
                    }
                }

                let mut nodes_to_add = vec![];

                //(2)  If the certificate policies extension includes the policy
                //anyPolicy with the qualifier set AP-Q and either (a)
                //inhibit_anyPolicy is greater than 0 or (b) i<n and the
                //certificate is self-issued, then:
                if has_any_policy
                    && (inhibit_any_policy > 0
                        || (i < certs_in_cert_path as usize
                            && is_self_issued(&ca_cert.decoded_cert)))
                {
                    for p_index in &valid_policy_tree[i - 1] {
                        // for each node in the valid_policy_tree of depth i-1, for
                        // each value in the expected_policy_set (including
                        // anyPolicy) that does not appear in a child node, create a
                        // child node with the following values: set the valid_policy
                        // to the value from the expected_policy_set in the parent
                        // node, set the qualifier_set to AP-Q, and set the
                        // expected_policy_set to the value in the valid_policy from
                        // this node.
                        let parent = &pm[*p_index];
                        for ep in &parent.expected_policy_set {
                            if !has_child_node(pm, &parent.children, ep) {
                                let new_node = make_new_policy_node(
                                    *ep,
                                    &ap_q,
                                    ObjectIdentifierSet::from([*ep]),
                                    i as u8,
                                    &Some(*p_index),
                                );
                                nodes_to_add.push(new_node);
                            }
                        }
                    }
                }

                for node in nodes_to_add {
                    let parent_index = node.parent;
                    let node_index = pm.len();
                    pm.push(node);
                    if let Some(parent_index) = parent_index {
                        let parent = &pm[parent_index];
                        add_child_if_not_present(pm, &parent.children, node_index);
                    }
                    valid_policy_tree[i].push(node_index);
                }

                // (3)  If there is a node in the valid_policy_tree of depth i-1
                //       or less without any child nodes, delete that node.  Repeat
                //       this step until there are no nodes of depth i-1 or less
                //       without children.
                prune_childless_nodes(pm, &mut valid_policy_tree, i - 1);

                if valid_policy_tree[i].is_empty() {
                    valid_policy_tree_is_null = true;
                }
            } else {
                //(e)  If the certificate policies extension is not present, set the
                //valid_policy_tree to NULL.
                valid_policy_tree_is_null = true;
            }
        }

        // (f)  Verify that either explicit_policy is greater than 0 or the
        //      valid_policy_tree is not equal to NULL
        if explicit_policy == 0 && valid_policy_tree_is_null {
            log_error_for_ca(ca_cert, "NULL policy set while processing certification path");
            set_validation_status(cpr, PathValidationStatus::NullPolicySet);
            set_failing_cert_index(cpr, v.len() - 1 - pos);
            return Err(Error::PathValidation(PathValidationStatus::NullPolicySet));
        }

        if i != certs_in_cert_path as usize {
            // 6.1.4 preparation for certificate i+1 (always occurs in this loop given the target
            // is processed in the else branch below)
            let pdv_ext: Option<&PDVExtension> = ca_cert.get_extension(&ID_CE_POLICY_MAPPINGS)?;
            if let Some(PDVExtension::PolicyMappings(policy_mappings)) = pdv_ext {
                add_processed_extension(cpr, ID_CE_POLICY_MAPPINGS);

                // collect everything that maps to a given issuer domain policy for convenience
                // while looking for anyPolicy in the extension
                let mut mappings: BTreeMap<ObjectIdentifier, ObjectIdentifierSet> = BTreeMap::new();

                //(a)  If a policy mappings extension is present, verify that the
                //special value anyPolicy does not appear as an
                //issuerDomainPolicy or a subjectDomainPolicy.
                for mapping in &policy_mappings.0 {
                    if ANY_POLICY == mapping.issuer_domain_policy
                        || ANY_POLICY == mapping.subject_domain_policy
                    {
                        log_error_for_ca(
                            ca_cert,
                            "anyPolicy appears in policy mappings extension",
                        );
                        set_validation_status(cpr, PathValidationStatus::NullPolicySet);
                        set_failing_cert_index(cpr, v.len() - 1 - pos);
                        return Err(Error::PathValidation(PathValidationStatus::NullPolicySet));
                    } else {
                        mappings
                            .entry(mapping.issuer_domain_policy)
                            .or_default()
                            .insert(mapping.subject_domain_policy);
                    }
                }

                // (b)  If a policy mappings extension is present, then for each
                //       issuerDomainPolicy ID-P in the policy mappings extension:
                if policy_mapping > 0 {
                    // (1)  If the policy_mapping variable is greater than 0, for each
                    //      node in the valid_policy_tree of depth i where ID-P is the
                    //      valid_policy, set expected_policy_set to the set of
                    //      subjectDomainPolicy values that are specified as
                    //      equivalent to ID-P by the policy mappings extension.
                    let mut ap: Option<usize> = None;
                    for p_index in &valid_policy_tree[i] {
                        let p = &mut pm[*p_index];
                        if mappings.contains_key(&p.valid_policy) {
                            p.expected_policy_set.clear();

                            for s in &mappings[&p.valid_policy] {
                                p.expected_policy_set.insert(*s);
                            }
                            // remove the mappings that were actually processed
                            mappings.remove(&p.valid_policy);
                        }
                        if ANY_POLICY == p.valid_policy {
                            ap = Some(*p_index);
                        }
                    }

                    //  If no node of depth i in the valid_policy_tree has a
                    //  valid_policy of ID-P but there is a node of depth i with a
                    //  valid_policy of anyPolicy, then generate a child node of
                    //  the node of depth i-1 that has a valid_policy of anyPolicy
                    //  as follows:
                    //
                    //  (i)    set the valid_policy to ID-P;
                    //
                    //  (ii)   set the qualifier_set to the qualifier set of the
                    //         policy anyPolicy in the certificate policies
                    //         extension of certificate i; and
                    //
                    //  (iii)  set the expected_policy_set to the set of
                    //         subjectDomainPolicy values that are specified as
                    //         equivalent to ID-P by the policy mappings extension.
                    if !mappings.is_empty() {
                        if let Some(any_index) = ap {
                            let parent_index = pm[any_index].parent;
                            let mut nodes_to_add = vec![];
                            for m in mappings {
                                let new_node = make_new_policy_node(
                                    m.0,
                                    &pm[any_index].qualifier_set.clone(),
                                    m.1.clone(),
                                    i as u8,
                                    &parent_index,
                                );
                                nodes_to_add.push(new_node);
                            }
                            for node in nodes_to_add {
                                let parent_index = node.parent;
                                let node_index = pm.len();
                                pm.push(node);
                                if let Some(parent_index) = parent_index {
                                    let parent = &pm[parent_index];
                                    add_child_if_not_present(pm, &parent.children, node_index);
                                }
                                valid_policy_tree[i].push(node_index);
                            }
                        }
                    }
                } else {
                    // (2)  If the policy_mapping variable is equal to 0:
                    //
                    //     (i)    delete each node of depth i in the valid_policy_tree
                    //            where ID-P is the valid_policy.
                    for m in mappings {
                        let to_remove: Vec<usize> = valid_policy_tree[i]
                            .iter()
                            .copied()
                            .filter(|x| row_elem_is_policy(pm, x, m.0))
                            .collect();
                        for node_index in to_remove {
                            remove_row_node(pm, &mut valid_policy_tree[i], node_index);
                        }
                    }

                    //     (ii)   If there is a node in the valid_policy_tree of depth
                    //            i-1 or less without any child nodes, delete that
                    //            node.  Repeat this step until there are no nodes of
                    //            depth i-1 or less without children.
                    prune_childless_nodes(pm, &mut valid_policy_tree, i - 1);
                }
            }

            // 6.1.4 (h)  If certificate i is not self-issued, decrement the policy
            //            state variables by 1 where greater than 0.
            if !is_self_issued(&ca_cert.decoded_cert) {
                explicit_policy = explicit_policy.saturating_sub(1);
                inhibit_any_policy = inhibit_any_policy.saturating_sub(1);
                policy_mapping = policy_mapping.saturating_sub(1);
            }

            // 6.1.4 (i)  Policy constraints may clamp the counters downward but never raise them.
            let pdv_ext: Option<&PDVExtension> =
                ca_cert.get_extension(&ID_CE_POLICY_CONSTRAINTS)?;
            if let Some(PDVExtension::PolicyConstraints(pc)) = pdv_ext {
                add_processed_extension(cpr, ID_CE_POLICY_CONSTRAINTS);
                if let Some(rep) = pc.require_explicit_policy {
                    explicit_policy = explicit_policy.min(rep)
                }
                if let Some(ipm) = pc.inhibit_policy_mapping {
                    policy_mapping = policy_mapping.min(ipm)
                }
            }
            // 6.1.4 (j)  As above for inhibitAnyPolicy.
            let pdv_ext: Option<&PDVExtension> =
                ca_cert.get_extension(&ID_CE_INHIBIT_ANY_POLICY)?;
            if let Some(PDVExtension::InhibitAnyPolicy(iap)) = pdv_ext {
                add_processed_extension(cpr, ID_CE_INHIBIT_ANY_POLICY);
                inhibit_any_policy = inhibit_any_policy.min(iap.0);
            }
        } else {
            // 6.1.5 wrap-up procedure

            // (a)  If explicit_policy is not 0, decrement explicit_policy by 1.
            explicit_policy = explicit_policy.saturating_sub(1);

            let pdv_ext: Option<&PDVExtension> =
                ca_cert.get_extension(&ID_CE_POLICY_CONSTRAINTS)?;
            if let Some(PDVExtension::PolicyConstraints(pc)) = pdv_ext {
                // (b)  If a policy constraints extension is included in the
                //      certificate and requireExplicitPolicy is present and has a
                //      value of 0, set the explicit_policy state variable to 0.
                add_processed_extension(cpr, ID_CE_POLICY_CONSTRAINTS);
                if let Some(rep) = pc.require_explicit_policy {
                    explicit_policy = explicit_policy.min(rep)
                }
            }

            //both of these result in a no-op, i.e., valid_policy_tree is unchanged.
            //(i)    If the valid_policy_tree is NULL, the intersection is
            //NULL.

            //(ii)   If the valid_policy_tree is not NULL and the user-
            //initial-policy-set is any-policy, the intersection is
            //the entire valid_policy_tree.
            if !valid_policy_tree_is_null
                && !initial_policy_set.contains(&ANY_POLICY)
                && valid_policy_tree.len() > 1
            {
                //the valid_policy_tree is not null and the initial policy set does not contain
                //anyPolicy so the intersection of the two needs to be calculated

                //(iii)  If the valid_policy_tree is not NULL and the user-
                //initial-policy-set is not any-policy, calculate the
                //intersection of the valid_policy_tree and the user-
                //initial-policy-set as follows:

                //1.  Determine the set of policy nodes whose parent nodes
                //have a valid_policy of anyPolicy.  This is the
                //valid_policy_node_set.
                let mut valid_policy_node_set: Vec<usize> = Vec::new();
                let valid_policy_root = &pm[root_index];
                harvest_valid_policy_node_set(pm, valid_policy_root, &mut valid_policy_node_set);

                //2.  If the valid_policy of any node in the
                //valid_policy_node_set is not in the user-initial-
                //policy-set and is not anyPolicy, delete this node and
                //all its children.
                purge_policies(
                    pm,
                    &initial_policy_set,
                    &valid_policy_node_set,
                    &mut valid_policy_tree,
                );

                // 3.  If the valid_policy_tree includes a node of depth n
                //     with the valid_policy anyPolicy and the user-initial-
                //     policy-set is not any-policy, perform the following
                //     steps:
                let mut nodes_to_add = vec![];
                if let Some(any_index) =
                    policy_tree_row_contains_policy(pm, &valid_policy_tree[i], ANY_POLICY)
                {
                    //   a.  Set P-Q to the qualifier_set in the node of depth n
                    //       with valid_policy anyPolicy.
                    //
                    //   b.  For each P-OID in the user-initial-policy-set that is
                    //       not the valid_policy of a node in the
                    //       valid_policy_node_set, create a child node whose
                    //       parent is the node of depth n-1 with the valid_policy
                    //       anyPolicy.  Set the values in the child node as
                    //       follows: set the valid_policy to P-OID, set the
                    //       qualifier_set to P-Q, and set the expected_policy_set
                    //       to {P-OID}.
                    //
                    //   c.  Delete the node of depth n with the valid_policy
                    //       anyPolicy.
                    let p_q = pm[any_index].qualifier_set.clone();
                    let parent_index = pm[any_index].parent;

                    let mut represented = ObjectIdentifierSet::new();
                    for node_index in &valid_policy_node_set {
                        represented.insert(pm[*node_index].valid_policy);
                    }

                    for p in &initial_policy_set {
                        if !represented.contains(p) {
                            let new_node = make_new_policy_node(
                                *p,
                                &p_q,
                                ObjectIdentifierSet::from([*p]),
                                i as u8,
                                &parent_index,
                            );
                            nodes_to_add.push(new_node);
                        }
                    }
                    remove_row_node(pm, &mut valid_policy_tree[i], any_index);
                }

                for node in nodes_to_add {
                    let parent_index = node.parent;
                    let node_index = pm.len();
                    pm.push(node);
                    if let Some(parent_index) = parent_index {
                        let parent = &pm[parent_index];
                        add_child_if_not_present(pm, &parent.children, node_index);
                    }
                    valid_policy_tree[i].push(node_index);
                }

                //4.  If there is a node in the valid_policy_tree of depth
                //n-1 or less without any child nodes, delete that node.
                //Repeat this step until there are no nodes of depth n-1
                //or less without children.
                prune_childless_nodes(pm, &mut valid_policy_tree, i - 1);

                if valid_policy_tree[i].is_empty() {
                    valid_policy_tree_is_null = true;
                }
            }
            if explicit_policy == 0 && valid_policy_tree_is_null {
                log_error_for_ca(
                    ca_cert,
                    "NULL policy set while processing target certificate",
                );
                set_validation_status(cpr, PathValidationStatus::NullPolicySet);
                set_failing_cert_index(cpr, 0);
                return Err(Error::PathValidation(PathValidationStatus::NullPolicySet));
            }
        }
    } // end for (pos, ca_cert) in v.iter().enumerate()

    let mut final_valid_policy_tree: FinalValidPolicyTree = FinalValidPolicyTree::new();
    if !valid_policy_tree_is_null {
        for row in valid_policy_tree {
            let mut new_row = Vec::new();
            for node in row {
                let p = &pm[node];
                let vptn = ValidPolicyTreeNode {
                    valid_policy: p.valid_policy,
                    qualifier_set: p.qualifier_set.clone(),
                    expected_policy_set: p.expected_policy_set.clone(),
                };
                new_row.push(vptn);
            }
            final_valid_policy_tree.push(new_row);
        }
    }
    set_final_valid_policy_tree(cpr, final_valid_policy_tree);

    Ok(())
}
