use crate::models::calendar::Calendar;
use crate::models::category::ExpenseCategory;
use crate::models::export::{ExportOptions, ExportSummary};
use crate::models::transaction::{Timestamp, Transaction, TransactionType};
use crate::models::wallet::Wallet;

/// Byte-order mark so spreadsheet apps open the file as UTF-8.
pub const UTF8_BOM: char = '\u{FEFF}';

/// Column headers of the CSV export.
pub const CSV_HEADERS: [&str; 6] = ["Ngày", "Loại", "Danh mục", "Ví", "Số tiền", "Ghi chú"];

const LABEL_EXPENSE: &str = "Chi tiêu";
const LABEL_INCOME: &str = "Thu nhập";
const LABEL_TOTAL_INCOME: &str = "Tổng thu nhập";
const LABEL_TOTAL_EXPENSE: &str = "Tổng chi tiêu";
const LABEL_NET: &str = "Chênh lệch";
const UNKNOWN_NAME: &str = "Unknown";

/// Produces export files from the root collections.
///
/// CSV layout (kept stable for downstream spreadsheets):
/// ```text
/// <BOM>Ngày,Loại,Danh mục,Ví,Số tiền,Ghi chú
/// dd/mm/yyyy,<type>,<category>,<wallet>,<amount>,"<note>"
/// ...
/// <blank row>
/// Tổng thu nhập,,,,<income>,
/// Tổng chi tiêu,,,,<expense>,
/// Chênh lệch,,,,<income - expense>,
/// ```
pub struct ExportService {
    calendar: Calendar,
}

impl ExportService {
    pub fn new(calendar: Calendar) -> Self {
        Self { calendar }
    }

    /// Apply the date range, category, and wallet filters; newest first.
    pub fn filter_transactions(
        &self,
        transactions: &[Transaction],
        options: &ExportOptions,
    ) -> Vec<Transaction> {
        let mut filtered: Vec<Transaction> = transactions
            .iter()
            .filter(|t| options.date_range.map_or(true, |r| r.contains(t.date)))
            .filter(|t| options.categories.is_empty() || options.categories.contains(&t.category_id))
            .filter(|t| options.wallets.is_empty() || options.wallets.contains(&t.wallet_id))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        filtered
    }

    pub fn calculate_summary(&self, transactions: &[Transaction]) -> ExportSummary {
        let mut summary = ExportSummary {
            transaction_count: transactions.len(),
            ..ExportSummary::default()
        };
        for t in transactions {
            match t.transaction_type {
                TransactionType::Income => summary.total_income += t.amount,
                TransactionType::Expense => summary.total_expense += t.amount,
            }
        }
        summary.net = summary.total_income - summary.total_expense;
        summary
    }

    /// Render the filtered transactions as CSV text, BOM included.
    pub fn export_to_csv(
        &self,
        transactions: &[Transaction],
        categories: &[ExpenseCategory],
        wallets: &[Wallet],
        options: &ExportOptions,
    ) -> String {
        let filtered = self.filter_transactions(transactions, options);
        let summary = self.calculate_summary(&filtered);

        let mut lines = Vec::with_capacity(filtered.len() + 5);
        lines.push(CSV_HEADERS.join(","));

        for t in &filtered {
            let type_label = match t.transaction_type {
                TransactionType::Expense => LABEL_EXPENSE,
                TransactionType::Income => LABEL_INCOME,
            };
            lines.push(
                [
                    self.format_date(t.date),
                    type_label.to_string(),
                    escape(category_name(&t.category_id, categories)),
                    escape(wallet_name(&t.wallet_id, wallets)),
                    t.amount.to_string(),
                    quote(&t.note),
                ]
                .join(","),
            );
        }

        lines.push(String::new());
        lines.push(summary_row(LABEL_TOTAL_INCOME, summary.total_income));
        lines.push(summary_row(LABEL_TOTAL_EXPENSE, summary.total_expense));
        lines.push(summary_row(LABEL_NET, summary.net));

        let mut csv = String::new();
        csv.push(UTF8_BOM);
        csv.push_str(&lines.join("\n"));
        csv
    }

    /// `dd/mm/yyyy` in the export calendar; empty for out-of-range timestamps.
    pub fn format_date(&self, ts: Timestamp) -> String {
        self.calendar
            .date(ts)
            .map(|d| d.format("%d/%m/%Y").to_string())
            .unwrap_or_default()
    }

    /// `<prefix>-YYYY-MM-DD.<extension>` for the day containing `now`.
    pub fn generate_filename(&self, prefix: &str, extension: &str, now: Timestamp) -> String {
        let date = self
            .calendar
            .date(now)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        format!("{prefix}-{date}.{extension}")
    }
}

pub fn category_name<'a>(category_id: &str, categories: &'a [ExpenseCategory]) -> &'a str {
    categories
        .iter()
        .find(|c| c.id == category_id)
        .map(|c| c.name.as_str())
        .unwrap_or(UNKNOWN_NAME)
}

pub fn wallet_name<'a>(wallet_id: &str, wallets: &'a [Wallet]) -> &'a str {
    wallets
        .iter()
        .find(|w| w.id == wallet_id)
        .map(|w| w.name.as_str())
        .unwrap_or(UNKNOWN_NAME)
}

/// Always quoted; embedded quotes doubled.
fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Quoted only when the field contains a delimiter, quote, or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        quote(field)
    } else {
        field.to_string()
    }
}

fn summary_row(label: &str, amount: f64) -> String {
    format!("{label},,,,{amount},")
}
