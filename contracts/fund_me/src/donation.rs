//! The donate transition and receipt lookup.

use tracing::{info, warn};

use crate::address::Address;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::storage::{DonationTransition, RecordStore};
use crate::types::{validate_donation, DonationReceipt, Project};
use crate::FundMe;

impl<S: RecordStore, C: Clock> FundMe<S, C> {
    /// Donate `amount` from `user` to the project at `project_address`.
    ///
    /// Checks run in this order and the first failure is returned:
    ///
    /// 1. the project exists ([`Error::NotFound`]);
    /// 2. it is still open, `now <= end_time` ([`Error::ProjectExpired`]);
    /// 3. `amount` and `timestamp` are positive ([`Error::Validation`]);
    /// 4. no receipt exists for `(user, project, timestamp)`
    ///    ([`Error::DuplicateDonation`]).
    ///
    /// Then `current_amount` is increased with checked addition
    /// ([`Error::ArithmeticOverflow`]) and a receipt is written at
    /// `derive("receipt", user, project, timestamp)`. Both writes commit
    /// together; a failed call leaves no trace.
    pub async fn donate(
        &self,
        user: Address,
        project_address: Address,
        amount: u64,
        timestamp: i64,
    ) -> Result<DonationReceipt> {
        let (receipt_address, bump) = self.receipt_address(&user, &project_address, timestamp)?;
        let program_id = self.program_id;
        let now = self.clock.now();

        let transition: DonationTransition = Box::new(move |project: &mut Project, receipt_taken| {
            if project.address(&program_id).ok() != Some(project_address) {
                return Err(Error::AddressMismatch(project_address));
            }
            if !project.is_open(now) {
                return Err(Error::ProjectExpired {
                    end_time: project.end_time,
                    now,
                });
            }
            validate_donation(amount, timestamp)?;
            if receipt_taken {
                return Err(Error::DuplicateDonation(receipt_address));
            }

            project.current_amount = project
                .current_amount
                .checked_add(amount)
                .ok_or(Error::ArithmeticOverflow)?;

            Ok(DonationReceipt {
                user,
                project: project_address,
                amount,
                timestamp,
                refunded: false,
                bump,
            })
        });

        match self
            .store
            .apply_donation(&project_address, &receipt_address, transition)
            .await
        {
            Ok((project, receipt)) => {
                info!("Donation received: {amount} from {user} to {project_address}");
                info!(
                    "Total raised: {}/{}",
                    project.current_amount, project.target_amount
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!("Donation from {user} to {project_address} rejected: {e}");
                Err(e)
            }
        }
    }

    /// Retrieve the donation receipt stored at `address`.
    pub async fn get_receipt(&self, address: &Address) -> Result<DonationReceipt> {
        self.store
            .load_receipt(address)
            .await?
            .ok_or(Error::NotFound(*address))
    }
}
