//! Utility functions related to certificate policy processing in support of certification path
//! validation. Functions, structures, etc. in this file are pub(crate).

use std::cell::RefCell;

use const_oid::db::rfc5280::ANY_POLICY;
use der::asn1::ObjectIdentifier;

use crate::validator::path_settings::ObjectIdentifierSet;

/// PolicyProcessingData is used by check_certificate_policies as the node type in the
/// valid_policy_tree. The first three fields correspond to the three fields shown in Figure 3 in
/// section 6.1.2 of RFC 5280. The depth field indicates the row in the valid_policy_tree where the
/// node was added. All nodes in the valid_policy_tree except the root node have a parent. The
/// parent is the node whose evaluation caused a child node to be added. Child-less nodes are
/// periodically pruned from the valid_policy_tree.
///
/// The first five fields are established when a node is created and are not altered. The children
/// field is updated as subordinate nodes are added or removed.
///
/// The valid_policy_tree is backed by a PolicyPool instance that owns all PolicyProcessingData
/// instances that comprise the valid_policy_tree. Parent and children references are expressed as
/// indices into the pool, i.e., ownership flows down the tree and upward references are non-owning.
#[derive(Clone)]
pub(crate) struct PolicyProcessingData {
    pub(crate) valid_policy: ObjectIdentifier,
    pub(crate) qualifier_set: Option<Vec<u8>>,
    pub(crate) expected_policy_set: ObjectIdentifierSet,
    pub(crate) depth: u8,
    pub(crate) parent: Option<usize>,
    pub(crate) children: RefCell<Vec<usize>>,
}

impl PartialEq for PolicyProcessingData {
    fn eq(&self, other: &Self) -> bool {
        self.valid_policy == other.valid_policy
    }
}

/// The PolicyPool type is used to maintain the list of PolicyProcessingData instances that back a
/// valid_policy_tree.
pub(crate) type PolicyPool = Vec<PolicyProcessingData>;

/// The PolicyTreeRow type is used to represent rows in the valid_policy_tree. Each element is an
/// index into the PolicyPool instance that backs the valid_policy_tree.
pub(crate) type PolicyTreeRow = Vec<usize>;

pub(crate) fn has_child_node(
    pool: &PolicyPool,
    children: &RefCell<Vec<usize>>,
    oid: &ObjectIdentifier,
) -> bool {
    for ps_index in children.borrow().iter() {
        let ps = &pool[*ps_index];
        if ps.valid_policy == *oid {
            return true;
        }
    }
    false
}

pub(crate) fn add_child_if_not_present(
    pool: &PolicyPool,
    children: &RefCell<Vec<usize>>,
    new_child_index: usize,
) {
    let new_child = &pool[new_child_index];
    if !has_child_node(pool, children, &new_child.valid_policy) {
        children.borrow_mut().push(new_child_index);
    }
}

pub(crate) fn row_elem_is_policy(pool: &PolicyPool, elem: &usize, oid: ObjectIdentifier) -> bool {
    pool[*elem].valid_policy == oid
}

/// policy_tree_row_contains_policy searches row for policy_oid and returns the index of the
/// PolicyProcessingData item in the pool if it is found. None is returned if not found.
pub(crate) fn policy_tree_row_contains_policy(
    pool: &PolicyPool,
    row: &PolicyTreeRow,
    policy_oid: ObjectIdentifier,
) -> Option<usize> {
    for item_index in row {
        let item = &pool[*item_index];
        if item.valid_policy == policy_oid {
            return Some(*item_index);
        }
    }
    None
}

pub(crate) fn num_kids_is_zero(pool: &PolicyPool, index: usize) -> bool {
    if pool.len() > index {
        let p = &pool[index];
        return p.children.borrow().is_empty();
    }
    true
}

pub(crate) fn make_new_policy_node(
    valid_policy: ObjectIdentifier,
    qualifiers: &Option<Vec<u8>>,
    expected_policy_set: ObjectIdentifierSet,
    depth: u8,
    parent: &Option<usize>,
) -> PolicyProcessingData {
    PolicyProcessingData {
        valid_policy,
        qualifier_set: qualifiers.clone(),
        expected_policy_set,
        depth,
        parent: *parent,
        children: RefCell::new(vec![]),
    }
}

pub(crate) fn make_new_policy_node_add_to_pool(
    pm: &mut PolicyPool,
    valid_policy: ObjectIdentifier,
    qualifiers: &Option<Vec<u8>>,
    expected_policy_set: ObjectIdentifierSet,
    depth: u8,
    parent: &Option<usize>,
) -> usize {
    let node = make_new_policy_node(valid_policy, qualifiers, expected_policy_set, depth, parent);
    let cur_index = pm.len();
    pm.push(node);
    cur_index
}

pub(crate) fn harvest_valid_policy_node_set(
    pool: &PolicyPool,
    cur_node: &PolicyProcessingData,
    valid_policy_node_set: &mut Vec<usize>,
) {
    if cur_node.valid_policy == ANY_POLICY {
        for c_index in cur_node.children.borrow().iter() {
            valid_policy_node_set.push(*c_index);
            let c = &pool[*c_index];
            harvest_valid_policy_node_set(pool, c, valid_policy_node_set);
        }
    }
}

pub(crate) fn purge_policies(
    pool: &PolicyPool,
    initial_policy_set: &ObjectIdentifierSet,
    valid_policy_node_set: &[usize],
    valid_policy_tree: &mut [PolicyTreeRow],
) {
    for pol in valid_policy_node_set {
        let p = &pool[*pol];
        if p.valid_policy != ANY_POLICY && !initial_policy_set.contains(&p.valid_policy) {
            if let Some(parent_index) = p.parent {
                let parent = &pool[parent_index];
                parent
                    .children
                    .borrow_mut()
                    .retain(|x| !row_elem_is_policy(pool, x, p.valid_policy));
                remove_node_and_children(pool, valid_policy_tree, p, pol);
            }
        }
    }
}

pub(crate) fn remove_node_and_children(
    pool: &PolicyPool,
    valid_policy_tree: &mut [PolicyTreeRow],
    node: &PolicyProcessingData,
    node_index: &usize,
) {
    let children = node.children.borrow().clone();
    for c_index in children {
        let c = &pool[c_index];
        remove_node_and_children(pool, valid_policy_tree, c, &c_index);
    }
    node.children.borrow_mut().clear();
    valid_policy_tree[node.depth as usize].retain(|x| *x != *node_index);
}
