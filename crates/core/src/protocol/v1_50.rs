//! Dialect of server 1.50 and newer.
//!
//! Account balances moved under `adata.pdperiods`, a list of
//! `[date, balance]` pairs; the client reads the first period. This is the
//! only revision transactions are posted with.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use ledgersync_shared::types::ApiVersion;

use super::dialect::ApiDialect;
use super::error::ProtocolError;
use super::json;
use super::quantity::WireStyle;
use super::tree::account_from_balances;
use super::wire::{self, WireAmount};
use crate::model::{AccountNode, FormatContext, Posting, Transaction};

/// Amount style of this revision.
#[derive(Debug, Deserialize)]
pub struct Style {
    ascommodityside: Option<char>,
    #[serde(default)]
    ascommodityspaced: bool,
    asprecision: Option<u32>,
    asdecimalmark: Option<String>,
}

impl WireStyle for Style {
    fn commodity_side(&self) -> Option<char> {
        self.ascommodityside
    }

    fn commodity_spaced(&self) -> bool {
        self.ascommodityspaced
    }

    fn precision(&self) -> Option<u32> {
        self.asprecision
    }

    fn decimal_mark(&self) -> Option<String> {
        self.asdecimalmark.clone()
    }
}

#[derive(Debug, Deserialize)]
struct BalanceData {
    #[serde(default)]
    bdnumpostings: u64,
    bdincludingsubs: Option<Vec<WireAmount<Style>>>,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    #[serde(default)]
    pdperiods: Vec<(String, BalanceData)>,
}

#[derive(Debug, Deserialize)]
struct Account {
    aname: String,
    adata: Option<AccountData>,
}

impl Account {
    fn into_account(self) -> Result<AccountNode, ProtocolError> {
        let first_period = self
            .adata
            .and_then(|data| data.pdperiods.into_iter().next())
            .map(|(_, balance)| balance);
        let (posting_count, amounts) = match first_period {
            Some(balance) => (
                balance.bdnumpostings,
                wire::balances(balance.bdincludingsubs.as_deref().unwrap_or_default())?,
            ),
            None => (0, Vec::new()),
        };
        Ok(account_from_balances(self.aname, posting_count, amounts))
    }
}

const STATUS_UNMARKED: &str = "Unmarked";
const REGULAR_POSTING: &str = "RegularPosting";
const NO_ROUNDING: &str = "NoRounding";
const ENCODED_PRECISION: u32 = 2;
const ENCODED_INDEX: u64 = 1;

#[derive(Debug, Serialize)]
struct OutSourcePos {
    #[serde(rename = "sourceName")]
    source_name: &'static str,
    #[serde(rename = "sourceLine")]
    source_line: u32,
    #[serde(rename = "sourceColumn")]
    source_column: u32,
}

#[derive(Debug, Serialize)]
struct OutQuantity {
    #[serde(rename = "decimalPlaces")]
    decimal_places: u32,
    #[serde(rename = "decimalMantissa")]
    decimal_mantissa: i64,
    #[serde(rename = "floatingPoint")]
    floating_point: f64,
}

impl OutQuantity {
    fn from_decimal(value: Decimal) -> Result<Self, ProtocolError> {
        let places = value.scale().max(ENCODED_PRECISION);
        let mut scaled = value;
        scaled.rescale(places);
        let decimal_mantissa = i64::try_from(scaled.mantissa())
            .map_err(|_| ProtocolError::Encode(format!("amount {value} is too large")))?;
        Ok(Self {
            decimal_places: places,
            decimal_mantissa,
            floating_point: value.to_f64().unwrap_or_default(),
        })
    }
}

#[derive(Debug, Serialize)]
struct OutStyle {
    ascommodityside: char,
    ascommodityspaced: bool,
    asdigitgroups: Option<()>,
    asdecimalmark: &'static str,
    asprecision: u32,
    asrounding: &'static str,
}

#[derive(Debug, Serialize)]
struct OutAmount<'a> {
    acommodity: &'a str,
    aismultiplier: bool,
    aquantity: OutQuantity,
    astyle: OutStyle,
    acost: Option<()>,
}

#[derive(Debug, Serialize)]
struct OutPosting<'a> {
    pbalanceassertion: Option<()>,
    pstatus: &'static str,
    paccount: &'a str,
    pamount: Vec<OutAmount<'a>>,
    pdate: Option<String>,
    pdate2: Option<String>,
    ptype: &'static str,
    pcomment: &'a str,
    ptags: Vec<(String, String)>,
    poriginal: Option<()>,
    ptransaction_: String,
}

impl<'a> OutPosting<'a> {
    fn new(posting: &'a Posting, ctx: &FormatContext) -> Result<Self, ProtocolError> {
        let pamount = match posting.amount {
            Some(value) => vec![OutAmount {
                acommodity: &posting.currency,
                aismultiplier: false,
                aquantity: OutQuantity::from_decimal(value)?,
                astyle: OutStyle {
                    ascommodityside: ctx.currency_position.commodity_side(),
                    ascommodityspaced: ctx.currency_spaced,
                    asdigitgroups: None,
                    asdecimalmark: ".",
                    asprecision: ENCODED_PRECISION,
                    asrounding: NO_ROUNDING,
                },
                acost: None,
            }],
            None => Vec::new(),
        };
        Ok(Self {
            pbalanceassertion: None,
            pstatus: STATUS_UNMARKED,
            paccount: &posting.account_name,
            pamount,
            pdate: None,
            pdate2: None,
            ptype: REGULAR_POSTING,
            pcomment: &posting.comment,
            ptags: Vec::new(),
            poriginal: None,
            ptransaction_: ENCODED_INDEX.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct OutTransaction<'a> {
    tcomment: &'a str,
    tprecedingcomment: &'static str,
    tpostings: Vec<OutPosting<'a>>,
    tdate: String,
    tdate2: Option<String>,
    tindex: u64,
    tdescription: &'a str,
    tcode: &'a str,
    tstatus: &'static str,
    ttags: Vec<(String, String)>,
    tsourcepos: [OutSourcePos; 2],
}

/// Decoder and encoder for 1.50 payloads.
#[derive(Debug)]
pub struct Dialect;

impl ApiDialect for Dialect {
    fn version(&self) -> ApiVersion {
        ApiVersion::V1_50
    }

    fn decode_accounts(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(AccountNode) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError> {
        json::for_each_element::<Account, _>(bytes, cancel, |raw| sink(raw.into_account()?))
    }

    fn decode_transactions(
        &self,
        bytes: &[u8],
        cancel: &CancellationToken,
        sink: &mut dyn FnMut(Transaction) -> Result<(), ProtocolError>,
    ) -> Result<usize, ProtocolError> {
        wire::decode_transactions::<Style>(bytes, cancel, sink)
    }

    /// Postings without an account name are left out. The transaction is
    /// always sent as index 1, unmarked, with a placeholder source span.
    fn encode_transaction(
        &self,
        transaction: &Transaction,
        ctx: &FormatContext,
    ) -> Result<Vec<u8>, ProtocolError> {
        let tpostings = transaction
            .postings
            .iter()
            .filter(|p| !p.account_name.trim().is_empty())
            .map(|p| OutPosting::new(p, ctx))
            .collect::<Result<Vec<_>, _>>()?;

        let body = OutTransaction {
            tcomment: &transaction.comment,
            tprecedingcomment: "",
            tpostings,
            tdate: transaction.date.format("%Y-%m-%d").to_string(),
            tdate2: None,
            tindex: ENCODED_INDEX,
            tdescription: &transaction.description,
            tcode: "",
            tstatus: STATUS_UNMARKED,
            ttags: Vec::new(),
            tsourcepos: [
                OutSourcePos {
                    source_name: "",
                    source_line: 1,
                    source_column: 1,
                },
                OutSourcePos {
                    source_name: "",
                    source_line: 2,
                    source_column: 1,
                },
            ],
        };
        serde_json::to_vec(&body).map_err(|e| ProtocolError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgersync_shared::types::CurrencyPosition;
    use rust_decimal_macros::dec;
    use serde_json::{Value, json};

    const ACCOUNTS: &str = r#"[
        {"aname":"root","adata":{"pdperiods":[["0000-01-01",{"bdnumpostings":0,"bdincludingsubs":[]}]],"pdpre":null}},
        {"aname":"Assets:Cash","adata":{
            "pdperiods":[["0000-01-01",{
                "bdnumpostings":4,
                "bdexcludingsubs":[],
                "bdincludingsubs":[
                    {"acommodity":"USD","aquantity":{"decimalMantissa":300,"decimalPlaces":2,"floatingPoint":3},
                     "astyle":{"ascommodityside":"L","ascommodityspaced":true,"asprecision":2,"asdecimalmark":".","asrounding":"NoRounding"}},
                    {"acommodity":"USD","aquantity":{"decimalMantissa":200,"decimalPlaces":2,"floatingPoint":2},
                     "astyle":{"ascommodityside":"L","ascommodityspaced":false,"asprecision":0,"asdecimalmark":".","asrounding":"NoRounding"}}
                ]}]],
            "pdpre":{"bdnumpostings":0,"bdincludingsubs":[],"bdexcludingsubs":[]}}},
        {"aname":"Equity","adata":{"pdperiods":[]}}
    ]"#;

    fn decode_accounts(json: &str) -> Vec<AccountNode> {
        let mut out = Vec::new();
        Dialect
            .decode_accounts(json.as_bytes(), &CancellationToken::new(), &mut |a| {
                out.push(a);
                Ok(())
            })
            .unwrap();
        out
    }

    #[test]
    fn test_balances_come_from_first_period() {
        let accounts = decode_accounts(ACCOUNTS);
        let cash = &accounts[1];
        assert_eq!(cash.posting_count(), 4);
        assert_eq!(cash.amount("USD"), Some(dec!(5)));
        let style = cash.amounts()[0].style.clone().unwrap();
        assert!(style.spaced);
        assert_eq!(style.precision, 2);
        assert!(accounts[2].amounts().is_empty());
    }

    #[test]
    fn test_malformed_periods() {
        let result = Dialect.decode_accounts(
            br#"[{"aname":"A","adata":{"pdperiods":[["0000-01-01"]]}}]"#,
            &CancellationToken::new(),
            &mut |_| Ok(()),
        );
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    fn sample_transaction() -> Transaction {
        let mut tx = Transaction::new(
            7,
            NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            "Lunch",
        );
        tx.comment = "team".into();
        tx.add_posting(Posting::new("Expenses:Food", dec!(10), "USD"));
        tx.add_posting(Posting::new("Assets:Cash", dec!(-10), "USD"));
        tx.add_posting(Posting::new("", dec!(0), "USD"));
        tx
    }

    #[test]
    fn test_encode_transaction_body() {
        let ctx = FormatContext {
            currency_position: CurrencyPosition::After,
            currency_spaced: true,
            ..FormatContext::default()
        };
        let bytes = Dialect.encode_transaction(&sample_transaction(), &ctx).unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["tdate"], "2025-06-30");
        assert_eq!(body["tdate2"], Value::Null);
        assert_eq!(body["tindex"], 1);
        assert_eq!(body["tdescription"], "Lunch");
        assert_eq!(body["tcomment"], "team");
        assert_eq!(body["tstatus"], "Unmarked");
        assert_eq!(body["ttags"], json!([]));
        assert_eq!(
            body["tsourcepos"],
            json!([
                {"sourceName":"","sourceLine":1,"sourceColumn":1},
                {"sourceName":"","sourceLine":2,"sourceColumn":1}
            ])
        );

        let postings = body["tpostings"].as_array().unwrap();
        assert_eq!(postings.len(), 2);
        let first = &postings[0];
        assert_eq!(first["paccount"], "Expenses:Food");
        assert_eq!(first["ptype"], "RegularPosting");
        assert_eq!(first["ptransaction_"], "1");
        assert_eq!(first["pbalanceassertion"], Value::Null);
        let amount = &first["pamount"][0];
        assert_eq!(amount["acommodity"], "USD");
        assert_eq!(amount["aquantity"]["decimalMantissa"], 1000);
        assert_eq!(amount["aquantity"]["decimalPlaces"], 2);
        assert_eq!(amount["astyle"]["ascommodityside"], "R");
        assert_eq!(amount["astyle"]["ascommodityspaced"], true);
        assert_eq!(amount["astyle"]["asprecision"], 2);
        assert_eq!(postings[1]["pamount"][0]["aquantity"]["decimalMantissa"], -1000);
    }

    #[test]
    fn test_encode_keeps_extra_decimals() {
        let mut tx = sample_transaction();
        tx.postings[0].amount = Some(dec!(0.125));
        let bytes = Dialect
            .encode_transaction(&tx, &FormatContext::default())
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let quantity = &body["tpostings"][0]["pamount"][0]["aquantity"];
        assert_eq!(quantity["decimalMantissa"], 125);
        assert_eq!(quantity["decimalPlaces"], 3);
    }

    #[test]
    fn test_encoded_body_decodes_back() {
        let tx = sample_transaction();
        let bytes = Dialect
            .encode_transaction(&tx, &FormatContext::default())
            .unwrap();
        let mut wrapped = b"[".to_vec();
        wrapped.extend_from_slice(&bytes);
        wrapped.push(b']');

        let mut decoded = Vec::new();
        Dialect
            .decode_transactions(&wrapped, &CancellationToken::new(), &mut |t| {
                decoded.push(t);
                Ok(())
            })
            .unwrap();
        let back = &decoded[0];
        assert_eq!(back.date, tx.date);
        assert_eq!(back.description, tx.description);
        assert_eq!(back.postings.len(), 2);
        assert_eq!(back.postings[0].amount, Some(dec!(10)));
        assert_eq!(back.postings[1].account_name, "Assets:Cash");
    }
}
