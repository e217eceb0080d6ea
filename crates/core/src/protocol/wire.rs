//! Record shapes shared by the flat-balance dialects.
//!
//! Up to 1.40 accounts carry their inclusive balance in `aibalance`, and
//! transactions look the same apart from the style object, so these shapes
//! are generic over the revision's style type.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use super::error::ProtocolError;
use super::json;
use super::quantity::{WireQuantity, WireStyle, quantity_or_zero};
use super::tree::account_from_balances;
use crate::model::{AccountNode, Posting, StyledAmount, Transaction, TransactionStatus};

/// Date format of `tdate`/`tdate2`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One amount: commodity, quantity and style.
#[derive(Debug, Deserialize)]
pub struct WireAmount<S> {
    /// Commodity symbol, possibly empty.
    #[serde(default)]
    pub acommodity: String,
    /// Quantity; null means zero.
    pub aquantity: Option<WireQuantity>,
    /// Display style.
    pub astyle: Option<S>,
}

impl<S: WireStyle> WireAmount<S> {
    /// Converts to a canonical amount.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` for an unrepresentable quantity.
    pub fn to_styled(&self) -> Result<StyledAmount, ProtocolError> {
        Ok(StyledAmount {
            currency: self.acommodity.clone(),
            magnitude: quantity_or_zero(self.aquantity.as_ref())?,
            style: self.astyle.as_ref().map(|s| s.to_style(&self.acommodity)),
        })
    }
}

/// Converts a balance list to canonical amounts.
///
/// # Errors
///
/// Returns `ProtocolError::Decode` for an unrepresentable quantity.
pub fn balances<S: WireStyle>(amounts: &[WireAmount<S>]) -> Result<Vec<StyledAmount>, ProtocolError> {
    amounts.iter().map(WireAmount::to_styled).collect()
}

/// An account with a flat inclusive balance.
#[derive(Debug, Deserialize)]
pub struct WireAccount<S> {
    /// Full account name.
    pub aname: String,
    /// Number of postings to this account.
    #[serde(default)]
    pub anumpostings: u64,
    /// Balance including subaccounts.
    pub aibalance: Option<Vec<WireAmount<S>>>,
}

impl<S: WireStyle> WireAccount<S> {
    /// Converts to a reported account node.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` for an unrepresentable quantity.
    pub fn into_account(self) -> Result<AccountNode, ProtocolError> {
        let amounts = balances(self.aibalance.as_deref().unwrap_or_default())?;
        Ok(account_from_balances(self.aname, self.anumpostings, amounts))
    }
}

/// One posting.
#[derive(Debug, Deserialize)]
pub struct WirePosting<S> {
    /// Account name.
    pub paccount: String,
    /// Amounts; only the first is used.
    pub pamount: Option<Vec<WireAmount<S>>>,
    /// Posting comment.
    pub pcomment: Option<String>,
}

impl<S: WireStyle> WirePosting<S> {
    /// Converts to a canonical posting; no amount means an unset amount.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` for an unrepresentable quantity.
    pub fn into_posting(self) -> Result<Posting, ProtocolError> {
        let first = self.pamount.as_deref().and_then(<[_]>::first);
        let (currency, amount, amount_style) = match first {
            Some(wire) => {
                let styled = wire.to_styled()?;
                (styled.currency, Some(styled.magnitude), styled.style)
            }
            None => (String::new(), None, None),
        };
        Ok(Posting {
            account_name: self.paccount,
            currency,
            amount,
            comment: self.pcomment.unwrap_or_default().trim().to_string(),
            amount_style,
        })
    }
}

/// One transaction.
#[derive(Debug, Deserialize)]
pub struct WireTransaction<S> {
    /// Server-side index.
    #[serde(default)]
    pub tindex: u64,
    /// Primary date.
    pub tdate: Option<String>,
    /// Secondary date.
    pub tdate2: Option<String>,
    /// Clearing status.
    pub tstatus: Option<String>,
    /// Transaction code.
    pub tcode: Option<String>,
    /// Description.
    pub tdescription: Option<String>,
    /// Comment.
    pub tcomment: Option<String>,
    /// Postings in declared order.
    pub tpostings: Option<Vec<WirePosting<S>>>,
}

impl<S: WireStyle> WireTransaction<S> {
    /// Converts to a canonical transaction.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Decode` if the date is missing or invalid.
    pub fn into_transaction(self) -> Result<Transaction, ProtocolError> {
        let Some(raw_date) = self.tdate.as_deref() else {
            return Err(ProtocolError::Decode(format!(
                "transaction {} has no date",
                self.tindex
            )));
        };
        let date = parse_date(raw_date)?;
        let date2 = self.tdate2.as_deref().map(parse_date).transpose()?;

        let postings = self
            .tpostings
            .unwrap_or_default()
            .into_iter()
            .map(WirePosting::into_posting)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Transaction {
            index: self.tindex,
            date,
            date2,
            status: TransactionStatus::from_wire(self.tstatus.as_deref().unwrap_or_default()),
            code: self.tcode.unwrap_or_default(),
            description: self.tdescription.unwrap_or_default(),
            comment: self.tcomment.unwrap_or_default().trim().to_string(),
            postings,
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ProtocolError> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| ProtocolError::Decode(format!("invalid date '{raw}': {e}")))
}

/// Streams flat-balance accounts.
///
/// # Errors
///
/// See [`json::for_each_element`].
pub fn decode_flat_accounts<S>(
    bytes: &[u8],
    cancel: &CancellationToken,
    sink: &mut dyn FnMut(AccountNode) -> Result<(), ProtocolError>,
) -> Result<usize, ProtocolError>
where
    S: WireStyle + DeserializeOwned,
{
    json::for_each_element::<WireAccount<S>, _>(bytes, cancel, |raw| sink(raw.into_account()?))
}

/// Streams transactions.
///
/// # Errors
///
/// See [`json::for_each_element`].
pub fn decode_transactions<S>(
    bytes: &[u8],
    cancel: &CancellationToken,
    sink: &mut dyn FnMut(Transaction) -> Result<(), ProtocolError>,
) -> Result<usize, ProtocolError>
where
    S: WireStyle + DeserializeOwned,
{
    json::for_each_element::<WireTransaction<S>, _>(bytes, cancel, |raw| {
        sink(raw.into_transaction()?)
    })
}
