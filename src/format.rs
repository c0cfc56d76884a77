use chrono::NaiveDate;

/// Format centavos as Brazilian reais, e.g. `R$ 1.234,56`
pub fn format_brl(cents: i64) -> String {
    let negative = cents < 0;
    let abs = cents.unsigned_abs();
    let whole = format_grouped(abs / 100);
    let frac = abs % 100;

    if negative {
        format!("-R$ {whole},{frac:02}")
    } else {
        format!("R$ {whole},{frac:02}")
    }
}

/// Group digits in thousands with `.` as pt-BR does
fn format_grouped(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }

    out.chars().rev().collect()
}

/// `dd/mm/yyyy`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Progressive CPF mask (`123.456.789-09`) over whatever digits were typed.
///
/// Non-digits are discarded. Digits past the eleventh are kept, unmasked.
pub fn format_cpf(input: &str) -> String {
    let digits: String = input.chars().filter(|c| c.is_ascii_digit()).collect();
    let n = digits.len();

    match n {
        0..=3 => digits,
        4..=6 => format!("{}.{}", &digits[..3], &digits[3..]),
        7..=9 => format!("{}.{}.{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => {
            let check_end = n.min(11);
            format!(
                "{}.{}.{}-{}{}",
                &digits[..3],
                &digits[3..6],
                &digits[6..9],
                &digits[9..check_end],
                &digits[check_end..]
            )
        }
    }
}
