use chrono::DateTime;
use chrono::Datelike;
use chrono::Local;
use chrono::Timelike;

const MONTH_NAMES: [&str; 12] = [
	"January",
	"February",
	"March",
	"April",
	"May",
	"June",
	"July",
	"August",
	"September",
	"October",
	"November",
	"December",
];

const WEEKDAY_NAMES: [&str; 7] = [
	"Monday",
	"Tuesday",
	"Wednesday",
	"Thursday",
	"Friday",
	"Saturday",
	"Sunday",
];

/// Render `instant` using a dateformat-style pattern.
///
/// Supported tokens: `yyyy`, `yy`, `mmmm`, `mmm`, `mm`, `m`, `dddd`, `ddd`,
/// `dd`, `d`, `HH`, `H` (24-hour), `hh`, `h` (12-hour), `MM`, `M` (minutes),
/// `ss`, `s`. Any other character is copied through verbatim, so the default
/// format strings (`dd/mm/yyyy`, `hh:MM:ss`, `yyyy_mm_dd-hh_MM_ss`) render
/// as written.
pub fn format_instant(instant: &DateTime<Local>, pattern: &str) -> String {
	let bytes = pattern.as_bytes();
	let mut out = String::with_capacity(pattern.len() + 4);
	let mut index = 0;

	while index < bytes.len() {
		let byte = bytes[index];
		let mut run = 1;
		while index + run < bytes.len() && bytes[index + run] == byte {
			run += 1;
		}

		match byte {
			b'y' => push_year(&mut out, instant, run),
			b'm' => push_month(&mut out, instant, run),
			b'd' => push_day(&mut out, instant, run),
			b'H' => push_padded(&mut out, instant.hour(), run),
			b'h' => push_padded(&mut out, instant.hour12().1, run),
			b'M' => push_padded(&mut out, instant.minute(), run),
			b's' => push_padded(&mut out, instant.second(), run),
			_ => {
				// Not a token: copy the run through, multi-byte chars included.
				let end = index + run;
				if let Some(literal) = pattern.get(index..end) {
					out.push_str(literal);
				}
			}
		}

		index += run;
	}

	out
}

fn push_year(out: &mut String, instant: &DateTime<Local>, run: usize) {
	let year = instant.year();
	if run >= 4 {
		out.push_str(&format!("{year:04}"));
	} else {
		out.push_str(&format!("{:02}", year.rem_euclid(100)));
	}
}

fn push_month(out: &mut String, instant: &DateTime<Local>, run: usize) {
	let name = MONTH_NAMES[instant.month0() as usize];
	match run {
		1 | 2 => push_padded(out, instant.month(), run),
		3 => out.push_str(&name[..3]),
		_ => out.push_str(name),
	}
}

fn push_day(out: &mut String, instant: &DateTime<Local>, run: usize) {
	let name = WEEKDAY_NAMES[instant.weekday().num_days_from_monday() as usize];
	match run {
		1 | 2 => push_padded(out, instant.day(), run),
		3 => out.push_str(&name[..3]),
		_ => out.push_str(name),
	}
}

fn push_padded(out: &mut String, value: u32, run: usize) {
	if run >= 2 {
		out.push_str(&format!("{value:02}"));
	} else {
		out.push_str(&value.to_string());
	}
}
