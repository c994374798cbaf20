//! Fixed accounting tables used by the summary columns.
//!
//! These are domain constants, identical for every sheet:
//!
//! - [`SUMMARY_LABELS`]: transaction field names written one per row into
//!   the DESCRIPTION column, starting at [`CATALOG_START_ROW`]
//! - [`NET_SALES_ADDED_ROWS`] / [`NET_SALES_SUBTRACTED_ROWS`]: the rows of the
//!   net sales reconciliation formula written into the header row

/// First worksheet row of the summary catalog.
pub const CATALOG_START_ROW: u32 = 9;

/// Summary labels in catalog order. Label `i` lives on row
/// `CATALOG_START_ROW + i`.
pub const SUMMARY_LABELS: [&str; 60] = [
    "GROSS_SLS", "VAT_AMNT", "VATABLE_SLS", "NONVAT_SLS", "VATEXEMPT_SLS", "VATEXEMPT_AMNT",
    "LOCAL_TAX", "PWD_DISC", "SNRCIT_DISC", "EMPLO_DISC", "AYALA_DISC", "STORE_DISC",
    "OTHER_DISC", "REFUND_AMT", "SCHRGE_AMT", "OTHER_SCHR", "CASH_SLS", "CARD_SLS",
    "EPAY_SLS", "DCARD_SLS", "OTHERSL_SLS", "CHECK_SLS", "GC_SLS", "MASTERCARD_SLS",
    "VISA_SLS", "AMEX_SLS", "DINERS_SLS", "JCB_SLS", "GCASH_SLS", "PAYMAYA_SLS",
    "ALIPAY_SLS", "WECHAT_SLS", "GRAB_SLS", "FOODPANDA_SLS", "MASTERDEBIT_SLS",
    "VISADEBIT_SLS", "PAYPAL_SLS", "ONLINE_SLS", "OPEN_SALES", "OPEN_SALES_2",
    "OPEN_SALES_3", "OPEN_SALES_4", "OPEN_SALES_5", "OPEN_SALES_6", "OPEN_SALES_7",
    "OPEN_SALES_8", "OPEN_SALES_9", "OPEN_SALES_10", "OPEN_SALES_11", "GC_EXCESS",
    "MOBILE_NO", "NO_CUST", "TRN_TYPE", "SLS_FLAG", "VAT_PCT", "QTY_SLD", "QTY",
    "ITEMCODE", "PRICE", "LDISC",
];

/// Last worksheet row of the summary catalog (68).
pub const CATALOG_END_ROW: u32 = CATALOG_START_ROW + SUMMARY_LABELS.len() as u32 - 1;

/// Rows added by the net sales formula, in emission order.
pub const NET_SALES_ADDED_ROWS: [u32; 21] = [
    46, 45, 44, 43, 42, 41, 31, 30, 29, 28, 27, 26, 25, 22, 21, 20, 19, 18, 17, 16, 14,
];

/// Rows subtracted by the net sales formula, in emission order.
pub const NET_SALES_SUBTRACTED_ROWS: [u32; 2] = [9, 58];

/// Catalog labels paired with their worksheet rows.
pub fn catalog_rows() -> impl Iterator<Item = (u32, &'static str)> {
    SUMMARY_LABELS
        .iter()
        .enumerate()
        .map(|(i, label)| (CATALOG_START_ROW + i as u32, *label))
}

/// Net sales formula for one column, e.g. `B46+B45+...+B14-B9-B58`.
pub fn net_sales_formula(column: &str) -> String {
    let added = NET_SALES_ADDED_ROWS
        .iter()
        .map(|row| format!("{column}{row}"))
        .collect::<Vec<_>>()
        .join("+");

    NET_SALES_SUBTRACTED_ROWS
        .iter()
        .fold(added, |acc, row| format!("{acc}-{column}{row}"))
}

/// Row total from column A through `last_column` on `row`.
pub fn row_sum_formula(last_column: &str, row: u32) -> String {
    format!("SUM(A{row}:{last_column}{row})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_bounds() {
        assert_eq!(SUMMARY_LABELS.len(), 60);
        assert_eq!(CATALOG_END_ROW, 68);
        let rows: Vec<_> = catalog_rows().collect();
        assert_eq!(rows.first(), Some(&(9, "GROSS_SLS")));
        assert_eq!(rows.last(), Some(&(68, "LDISC")));
    }

    #[test]
    fn test_labels_unique() {
        let mut labels = SUMMARY_LABELS.to_vec();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), SUMMARY_LABELS.len());
    }

    #[test]
    fn test_net_sales_formula_exact_text() {
        assert_eq!(
            net_sales_formula("B"),
            "B46+B45+B44+B43+B42+B41+B31+B30+B29+B28+B27+B26+B25+B22+B21+B20+B19+B18+B17+B16+B14-B9-B58"
        );
    }

    #[test]
    fn test_net_sales_formula_multi_letter_column() {
        let formula = net_sales_formula("AB");
        assert!(formula.starts_with("AB46+AB45"));
        assert!(formula.ends_with("+AB14-AB9-AB58"));
    }

    #[test]
    fn test_row_sum_formula() {
        assert_eq!(row_sum_formula("E", 9), "SUM(A9:E9)");
    }
}
