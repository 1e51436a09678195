use chrono::NaiveDate;

/// Format a date as "DD MON YYYY" with an upper-case month (e.g. "15 MAY 2024")
pub fn format_release_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string().to_uppercase()
}

/// Title of a draft release: "{tag} - {DD MON YYYY}"
pub fn release_title(tag: &str, date: NaiveDate) -> String {
    format!("{} - {}", tag, format_release_date(date))
}
