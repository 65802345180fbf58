//! Card service - virtual card issuance and management

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{CardColor, CardNetwork, CardStatus, VirtualCard};
use crate::ports::{Delay, SimulatedOp};
use crate::services::account_store::AccountStore;

pub struct CardService {
    delay: Arc<dyn Delay>,
}

impl CardService {
    pub fn new(delay: Arc<dyn Delay>) -> Self {
        Self { delay }
    }

    /// Issue a new card after the issuance delay
    pub async fn issue(
        &self,
        store: &mut AccountStore,
        network: CardNetwork,
        color: CardColor,
    ) -> Result<VirtualCard> {
        if !store.is_logged_in() {
            return Err(Error::NoActiveSession);
        }

        self.delay.wait(SimulatedOp::CardIssue).await;
        store
            .add_virtual_card(network, color)?
            .ok_or(Error::NoActiveSession)
    }

    /// Resolve a card by full id or by a unique id prefix
    pub fn find<'a>(&self, store: &'a AccountStore, id_or_prefix: &str) -> Result<&'a VirtualCard> {
        let needle = id_or_prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Err(Error::validation("Card id is required"));
        }

        let mut matches = store
            .cards()
            .iter()
            .filter(|c| c.id.to_string().starts_with(&needle));
        match (matches.next(), matches.next()) {
            (Some(card), None) => Ok(card),
            (Some(_), Some(_)) => Err(Error::validation(format!(
                "Card id '{}' is ambiguous",
                id_or_prefix
            ))),
            (None, _) => Err(Error::not_found(format!("Card {}", id_or_prefix))),
        }
    }

    /// Freeze an active card or unfreeze a frozen one
    pub fn toggle(&self, store: &mut AccountStore, id: Uuid) -> Result<CardStatus> {
        if !store.is_logged_in() {
            return Err(Error::NoActiveSession);
        }
        store
            .toggle_card_status(id)?
            .ok_or_else(|| Error::not_found(format!("Card {}", id)))
    }

    pub fn remove(&self, store: &mut AccountStore, id: Uuid) -> Result<()> {
        if !store.is_logged_in() {
            return Err(Error::NoActiveSession);
        }
        if store.remove_virtual_card(id)? {
            Ok(())
        } else {
            Err(Error::not_found(format!("Card {}", id)))
        }
    }
}
