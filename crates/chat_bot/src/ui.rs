use engine::{Amount, DateWindow, ReportSummary, TransactionKind, TransactionRecord};

use crate::{parsing::ParseError, state::Prompt};

/// Records listed under a report before the rest is summarised in one line.
pub(crate) const REPORT_PREVIEW_LEN: usize = 5;

const DATE_RANGE_HINT: &str = "DD-MM-YYYY DD-MM-YYYY";

pub(crate) const RECORD_FAILED: &str =
    "Terjadi kesalahan saat mencatat transaksi. Silakan coba lagi.";
pub(crate) const REPORT_FAILED: &str =
    "Terjadi kesalahan saat memproses laporan. Silakan coba lagi.";

/// Formats an amount the id-ID way: `5.000.000`, `12,5`.
pub(crate) fn format_amount(amount: Amount) -> String {
    let (units, frac) = amount.split_abs();
    let digits = units.to_string();

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 4);
    if amount.is_negative() {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    match frac {
        0 => {}
        f if f % 10 == 0 => out.push_str(&format!(",{}", f / 10)),
        f => out.push_str(&format!(",{f:02}")),
    }
    out
}

pub(crate) fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "Pemasukan",
        TransactionKind::Expense => "Pengeluaran",
    }
}

fn kind_marker(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Income => "➕",
        TransactionKind::Expense => "➖",
    }
}

pub(crate) fn render_recorded(record: &TransactionRecord) -> String {
    format!(
        "✅ {} tercatat:\nJumlah: {}\nDeskripsi: {}",
        kind_label(record.kind),
        format_amount(record.amount),
        record.description
    )
}

fn report_title(window: Option<&DateWindow>) -> String {
    match window {
        None => "Hari ini".to_string(),
        Some(window) => format!(
            "{} sampai {}",
            window.start().format("%d %b %Y"),
            window.end().format("%d %b %Y")
        ),
    }
}

/// Renders a report; `window` is `None` for the today report.
pub(crate) fn render_report(window: Option<&DateWindow>, summary: &ReportSummary) -> String {
    let balance = summary.balance();
    let balance_marker = if balance.is_negative() { "❌" } else { "✅" };

    let mut text = format!(
        "📊 Laporan Keuangan ({})\n\n💰 Total Pemasukan: {}\n💸 Total Pengeluaran: {}\n{} Saldo: {}\n\n",
        report_title(window),
        format_amount(summary.total_income),
        format_amount(summary.total_expense),
        balance_marker,
        format_amount(balance),
    );

    if summary.records.is_empty() {
        text.push_str("Tidak ada transaksi pada periode ini.");
        return text;
    }

    text.push_str("📝 Transaksi:");
    for record in summary.records.iter().take(REPORT_PREVIEW_LEN) {
        text.push_str(&format!(
            "\n{} {} - {}",
            kind_marker(record.kind),
            format_amount(record.amount),
            record.description
        ));
    }
    let hidden = summary.records.len().saturating_sub(REPORT_PREVIEW_LEN);
    if hidden > 0 {
        text.push_str(&format!("\n... dan {hidden} transaksi lainnya"));
    }
    text
}

pub(crate) fn prompt_text(prompt: Prompt) -> String {
    match prompt {
        Prompt::ReportOptions => format!(
            "Pilih opsi laporan keuangan:\n1️⃣ Hari ini\n2️⃣ Custom tanggal (format: {DATE_RANGE_HINT})\n\nKirim angka 1 atau 2 untuk memilih opsi."
        ),
        Prompt::DateRangeFormat => {
            format!("Silakan kirim rentang tanggal dengan format: {DATE_RANGE_HINT}")
        }
        Prompt::InvalidChoice => "Pilihan tidak valid. Silakan kirim angka 1 atau 2.".to_string(),
        Prompt::InvalidDateFormat => format!(
            "Format tanggal tidak valid. Silakan kirim rentang tanggal dengan format: {DATE_RANGE_HINT}"
        ),
        Prompt::InvertedDateRange => format!(
            "Tanggal awal tidak boleh setelah tanggal akhir. Silakan kirim ulang dengan format: {DATE_RANGE_HINT}"
        ),
    }
}

/// Corrective reply for a malformed `!in` / `!out`.
pub(crate) fn parse_error_hint(err: ParseError) -> String {
    match err {
        ParseError::MissingDescription => "Silakan berikan deskripsi untuk transaksi.".to_string(),
        ParseError::InvalidAmount => {
            "Format jumlah tidak valid. Gunakan format: !in/!out jumlah deskripsi".to_string()
        }
        ParseError::InvalidChoice => prompt_text(Prompt::InvalidChoice),
        ParseError::InvalidDateFormat => prompt_text(Prompt::InvalidDateFormat),
        ParseError::InvertedDateRange => prompt_text(Prompt::InvertedDateRange),
    }
}

pub(crate) fn help_text() -> &'static str {
    "🤖 Perintah Bot Keuangan\n\n\
1️⃣ Catat Pemasukan:\n\
!in <jumlah> <deskripsi>\n\
Contoh: !in 5000000 gaji\n\n\
2️⃣ Catat Pengeluaran:\n\
!out <jumlah> <deskripsi>\n\
Contoh: !out 50000 makan siang\n\n\
3️⃣ Lihat Laporan:\n\
!report lalu kirim 1 (hari ini) atau 2 (rentang tanggal)\n\
Contoh rentang: 01-06-2024 17-06-2024\n\n\
4️⃣ Bantuan:\n\
!help"
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;

    fn record(kind: TransactionKind, units: i64, description: &str) -> TransactionRecord {
        let timestamp =
            NaiveDateTime::parse_from_str("2024-06-01 10:00:00", engine::TIMESTAMP_FORMAT).unwrap();
        TransactionRecord::new(timestamp, kind, Amount::from_units(units), description).unwrap()
    }

    #[test]
    fn amounts_use_dot_grouping_and_comma_decimals() {
        assert_eq!(format_amount(Amount::ZERO), "0");
        assert_eq!(format_amount(Amount::from_units(950)), "950");
        assert_eq!(format_amount(Amount::from_units(50_000)), "50.000");
        assert_eq!(format_amount(Amount::from_units(5_000_000)), "5.000.000");
        assert_eq!(format_amount(Amount::from_units(-4_950_000)), "-4.950.000");
        assert_eq!(format_amount(Amount::from_minor(1_250)), "12,5");
        assert_eq!(format_amount(Amount::from_minor(123_405)), "1.234,05");
    }

    #[test]
    fn confirmation_names_the_kind() {
        let text = render_recorded(&record(TransactionKind::Income, 5_000_000, "gaji"));
        assert_eq!(
            text,
            "✅ Pemasukan tercatat:\nJumlah: 5.000.000\nDeskripsi: gaji"
        );
    }

    #[test]
    fn empty_report_says_so() {
        let text = render_report(None, &ReportSummary::default());
        assert!(text.starts_with("📊 Laporan Keuangan (Hari ini)"));
        assert!(text.contains("✅ Saldo: 0"));
        assert!(text.ends_with("Tidak ada transaksi pada periode ini."));
    }

    #[test]
    fn report_lists_five_records_and_counts_the_rest() {
        let records: Vec<_> = (1..=7)
            .map(|i| record(TransactionKind::Expense, i * 1_000, &format!("item {i}")))
            .collect();
        let summary = ReportSummary {
            total_income: Amount::ZERO,
            total_expense: Amount::from_units(28_000),
            records,
            skipped: 0,
        };
        let window = DateWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 17).unwrap(),
        )
        .unwrap();

        let text = render_report(Some(&window), &summary);

        assert!(text.starts_with("📊 Laporan Keuangan (01 Jun 2024 sampai 17 Jun 2024)"));
        assert!(text.contains("❌ Saldo: -28.000"));
        assert!(text.contains("➖ 5.000 - item 5"));
        assert!(!text.contains("item 6"));
        assert!(text.ends_with("... dan 2 transaksi lainnya"));
    }
}
