//! Small text-formatting helpers used across report-producing actions.

use std::collections::HashSet;
use std::hash::Hash;

/// Helper to convert a count to f64 for percentages
#[inline]
pub fn count_to_f64(count: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

fn ratio_pct(a: u64, b: u64) -> f64 {
    if b == 0 {
        0.0
    } else {
        count_to_f64(a) * 100.0 / count_to_f64(b)
    }
}

/// Format `a` as a share of `b`.
///
/// ```
/// use genokit::utils::text::percentage;
///
/// assert_eq!(percentage(100, 200), "100 of 200 (50.0%)");
/// ```
#[must_use]
pub fn percentage(a: u64, b: u64) -> String {
    format!("{a} of {b} ({:.1}%)", ratio_pct(a, b))
}

/// Same as [`percentage`] without the denominator: `"100 (50.0%)"`.
#[must_use]
pub fn percentage_short(a: u64, b: u64) -> String {
    format!("{a} ({:.1}%)", ratio_pct(a, b))
}

/// Group digits by thousands.
///
/// ```
/// use genokit::utils::text::thousands;
///
/// assert_eq!(thousands(12345), "12,345");
/// assert_eq!(thousands(999), "999");
/// ```
#[must_use]
pub fn thousands(x: u64) -> String {
    let digits = x.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

const DECIMAL_SUFFIXES: [&str; 8] = ["", "Kb", "Mb", "Gb", "Tb", "Pb", "Eb", "Zb"];
const BINARY_SUFFIXES: [&str; 8] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB"];

/// Convert a size to human-readable form.
///
/// With `binary` the multiple is 1024 and suffixes are `KiB`, `MiB`, ...;
/// otherwise the multiple is 1000 and suffixes are `Kb`, `Mb`, ...
/// When `target` names a suffix, the value is scaled to exactly that unit.
///
/// ```
/// use genokit::utils::text::human_size;
///
/// assert_eq!(human_size(1_000_000_000_000, true, 1, None), "931.3GiB");
/// assert_eq!(human_size(1_000_000_000_000, false, 1, None), "1.0Tb");
/// assert_eq!(human_size(300, false, 1, None), "300.0");
/// ```
#[must_use]
pub fn human_size(size: u64, binary: bool, precision: usize, target: Option<&str>) -> String {
    let (multiple, suffixes) = if binary {
        (1024.0, &BINARY_SUFFIXES)
    } else {
        (1000.0, &DECIMAL_SUFFIXES)
    };

    let mut size = count_to_f64(size);
    let mut chosen = suffixes[suffixes.len() - 1];
    for suffix in suffixes {
        chosen = suffix;
        if let Some(target) = target {
            if *suffix == target {
                break;
            }
            size /= multiple;
        } else if size >= multiple {
            size /= multiple;
        } else {
            break;
        }
    }

    format!("{size:.precision$}{chosen}")
}

/// Format a float the way tabular alignment tools print them: integral
/// values keep one decimal, very small or very large values use exponent
/// notation.
///
/// ```
/// use genokit::utils::text::format_float;
///
/// assert_eq!(format_float(200.0), "200.0");
/// assert_eq!(format_float(98.55), "98.55");
/// assert_eq!(format_float(1e-50), "1e-50");
/// ```
#[must_use]
pub fn format_float(x: f64) -> String {
    if x == 0.0 {
        "0.0".to_string()
    } else if x.abs() < 1e-4 || x.abs() >= 1e16 {
        format!("{x:e}")
    } else if x.fract() == 0.0 {
        format!("{x:.1}")
    } else {
        format!("{x}")
    }
}

/// Format with `precision` significant digits, switching to scientific
/// notation for very small or large values (printf `%g`).
///
/// ```
/// use genokit::utils::text::format_general;
///
/// assert_eq!(format_general(3.0e9, 1), "3e+09");
/// assert_eq!(format_general(0.046, 1), "0.05");
/// assert_eq!(format_general(7.0, 1), "7");
/// ```
#[must_use]
pub fn format_general(x: f64, precision: usize) -> String {
    if x == 0.0 {
        return "0".to_string();
    }
    let precision = precision.max(1);
    let sci = format!("{:.*e}", precision - 1, x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits = i32::try_from(precision).unwrap_or(i32::MAX);

    if exp < -4 || exp >= digits {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", strip_zeros(mantissa), exp.abs())
    } else {
        let decimals = usize::try_from(digits - 1 - exp).unwrap_or(0);
        strip_zeros(&format!("{x:.decimals$}")).to_string()
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Strip the alternative-splicing suffix from a gene name.
///
/// Annotation groups name isoforms inconsistently: most use `.N`, rice
/// (`Os...`) uses `-N`, maize (`GRM...`) uses `_N` and papaya (`ev...`)
/// puts the isoform after whitespace.
///
/// ```
/// use genokit::utils::text::gene_name;
///
/// assert_eq!(gene_name("At5g06540.1"), "At5g06540");
/// assert_eq!(gene_name("Os01g0100100-01"), "Os01g0100100");
/// assert_eq!(gene_name("GRMZM2G000001_T01"), "GRMZM2G000001");
/// ```
#[must_use]
pub fn gene_name(s: &str) -> &str {
    if s.starts_with("ev") {
        return s
            .trim_end()
            .rsplit_once(char::is_whitespace)
            .map_or(s, |(head, _)| head.trim_end());
    }

    let sep = if s.starts_with("Os") {
        '-'
    } else if s.starts_with("GRM") {
        '_'
    } else {
        '.'
    };
    s.rsplit_once(sep).map_or(s, |(head, _)| head)
}

/// Split a comma-separated list, trimming items and dropping empty and
/// repeated ones.
///
/// ```
/// use genokit::utils::text::split_list;
///
/// assert_eq!(split_list("chr1, chr2,,chr1"), vec!["chr1", "chr2"]);
/// ```
#[must_use]
pub fn split_list(s: &str) -> Vec<&str> {
    let items: Vec<&str> = s.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    uniqify(&items)
}

/// Remove duplicates, keeping the first occurrence of each item.
#[must_use]
pub fn uniqify<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}
