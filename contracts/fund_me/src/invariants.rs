#![allow(dead_code)]

use crate::address::Address;
use crate::types::{DonationReceipt, Project, ProjectMetadata};

/// A freshly registered project carries exactly its inputs and a zero total.
pub fn assert_fresh_project(
    project: &Project,
    owner: &Address,
    project_id: &str,
    metadata: &ProjectMetadata,
    target_amount: u64,
    end_time: i64,
) {
    assert_eq!(project.owner, *owner, "owner not stored as given");
    assert_eq!(project.project_id, project_id, "project_id not stored as given");
    assert_eq!(project.metadata, *metadata, "metadata not stored as given");
    assert_eq!(project.target_amount, target_amount, "target not stored as given");
    assert_eq!(project.current_amount, 0, "new project has a non-zero total");
    assert_eq!(project.end_time, end_time, "end_time not stored as given");
}

/// After a donation of `amount`, the total grows by exactly `amount`.
pub fn assert_deposit_invariant(balance_before: u64, balance_after: u64, amount: u64) {
    assert_eq!(
        balance_after,
        balance_before + amount,
        "deposit invariant broken: {} + {} != {}",
        balance_before,
        amount,
        balance_after
    );
}

/// The total never decreases between two observations.
pub fn assert_total_monotonic(before: &Project, after: &Project) {
    assert!(
        after.current_amount >= before.current_amount,
        "current_amount decreased from {} to {}",
        before.current_amount,
        after.current_amount
    );
}

/// Fields other than `current_amount` never change after creation.
pub fn assert_project_immutable_fields(original: &Project, current: &Project) {
    assert_eq!(original.owner, current.owner, "project owner changed");
    assert_eq!(original.project_id, current.project_id, "project_id changed");
    assert_eq!(original.metadata, current.metadata, "project metadata changed");
    assert_eq!(
        original.target_amount, current.target_amount,
        "project target_amount changed"
    );
    assert_eq!(original.end_time, current.end_time, "project end_time changed");
    assert_eq!(original.bump, current.bump, "project bump changed");
}

/// A receipt records exactly one donation and starts unrefunded.
pub fn assert_receipt_matches(
    receipt: &DonationReceipt,
    user: &Address,
    project: &Address,
    amount: u64,
    timestamp: i64,
) {
    assert_eq!(receipt.user, *user, "receipt user mismatch");
    assert_eq!(receipt.project, *project, "receipt project mismatch");
    assert_eq!(receipt.amount, amount, "receipt amount mismatch");
    assert_eq!(receipt.timestamp, timestamp, "receipt timestamp mismatch");
    assert!(receipt.timestamp > 0, "receipt timestamp must be positive");
    assert!(!receipt.refunded, "new receipt is already refunded");
}

/// A record's stored bump re-derives the address it was found at.
pub fn assert_project_rederives(project: &Project, address: &Address, program_id: &Address) {
    assert_eq!(
        project.address(program_id).as_ref(),
        Ok(address),
        "project bump {} does not re-derive {}",
        project.bump,
        address
    );
}

pub fn assert_receipt_rederives(
    receipt: &DonationReceipt,
    address: &Address,
    program_id: &Address,
) {
    assert_eq!(
        receipt.address(program_id).as_ref(),
        Ok(address),
        "receipt bump {} does not re-derive {}",
        receipt.bump,
        address
    );
}
