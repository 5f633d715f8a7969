//! Glyph widths of the standard 14 fonts.
//!
//! PDF writers may omit `/Widths` for the standard fonts, leaving viewers to
//! use the built-in Adobe metrics. Widths here cover the printable ASCII
//! codes 32..=126 and are in thousandths of an em.

/// Metrics of one standard font.
#[derive(Debug)]
pub struct CoreMetrics {
    /// PostScript name of the font
    pub name: &'static str,
    widths: &'static [u16; 95],
    default_width: u16,
}

impl CoreMetrics {
    /// Width of a character code; codes outside the table get the font's
    /// typical width.
    pub fn width(&self, code: u32) -> f32 {
        let width = code
            .checked_sub(32)
            .and_then(|i| self.widths.get(i as usize))
            .copied()
            .unwrap_or(self.default_width);
        f32::from(width)
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444,
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722,
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500,
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500,
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    930, 722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, 722, 778,
    611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, 333, 278, 333, 581, 500,
    333, 500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, 556, 500,
    556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, 394, 220, 394, 520,
];

#[rustfmt::skip]
const TIMES_ITALIC: [u16; 95] = [
    250, 333, 420, 500, 500, 833, 778, 214, 333, 333, 500, 675, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 675, 675, 675, 500,
    920, 611, 611, 667, 722, 611, 611, 722, 722, 333, 444, 667, 556, 833, 667, 722,
    611, 722, 611, 500, 556, 722, 611, 833, 611, 556, 556, 389, 278, 389, 422, 500,
    333, 500, 500, 444, 500, 444, 278, 500, 500, 278, 278, 444, 278, 722, 500, 500,
    500, 500, 389, 389, 278, 500, 444, 667, 444, 444, 389, 400, 275, 400, 541,
];

#[rustfmt::skip]
const TIMES_BOLD_ITALIC: [u16; 95] = [
    250, 389, 555, 500, 500, 833, 778, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 333, 333, 570, 570, 570, 500,
    832, 667, 667, 667, 722, 667, 667, 722, 778, 389, 500, 667, 611, 889, 722, 722,
    611, 722, 667, 556, 611, 722, 667, 889, 667, 611, 611, 333, 278, 333, 570, 500,
    333, 500, 500, 444, 500, 444, 333, 500, 556, 278, 278, 500, 278, 778, 556, 500,
    500, 500, 389, 389, 278, 556, 444, 667, 500, 444, 389, 348, 220, 348, 570,
];

const COURIER: [u16; 95] = [600; 95];

#[rustfmt::skip]
static CORE_FONTS: &[CoreMetrics] = &[
    CoreMetrics { name: "Helvetica", widths: &HELVETICA, default_width: 556 },
    CoreMetrics { name: "Helvetica-Oblique", widths: &HELVETICA, default_width: 556 },
    CoreMetrics { name: "Helvetica-Bold", widths: &HELVETICA_BOLD, default_width: 611 },
    CoreMetrics { name: "Helvetica-BoldOblique", widths: &HELVETICA_BOLD, default_width: 611 },
    CoreMetrics { name: "Times-Roman", widths: &TIMES_ROMAN, default_width: 500 },
    CoreMetrics { name: "Times-Bold", widths: &TIMES_BOLD, default_width: 500 },
    CoreMetrics { name: "Times-Italic", widths: &TIMES_ITALIC, default_width: 500 },
    CoreMetrics { name: "Times-BoldItalic", widths: &TIMES_BOLD_ITALIC, default_width: 500 },
    CoreMetrics { name: "Courier", widths: &COURIER, default_width: 600 },
    CoreMetrics { name: "Courier-Oblique", widths: &COURIER, default_width: 600 },
    CoreMetrics { name: "Courier-Bold", widths: &COURIER, default_width: 600 },
    CoreMetrics { name: "Courier-BoldOblique", widths: &COURIER, default_width: 600 },
];

/// Common aliases writers use for the standard fonts.
const ALIASES: &[(&str, &str)] = &[
    ("Arial", "Helvetica"),
    ("ArialMT", "Helvetica"),
    ("Arial,Italic", "Helvetica-Oblique"),
    ("Arial-ItalicMT", "Helvetica-Oblique"),
    ("Arial,Bold", "Helvetica-Bold"),
    ("Arial-BoldMT", "Helvetica-Bold"),
    ("Arial,BoldItalic", "Helvetica-BoldOblique"),
    ("Arial-BoldItalicMT", "Helvetica-BoldOblique"),
    ("TimesNewRoman", "Times-Roman"),
    ("TimesNewRomanPSMT", "Times-Roman"),
    ("TimesNewRoman,Bold", "Times-Bold"),
    ("TimesNewRomanPS-BoldMT", "Times-Bold"),
    ("TimesNewRoman,Italic", "Times-Italic"),
    ("TimesNewRomanPS-ItalicMT", "Times-Italic"),
    ("TimesNewRoman,BoldItalic", "Times-BoldItalic"),
    ("TimesNewRomanPS-BoldItalicMT", "Times-BoldItalic"),
    ("CourierNew", "Courier"),
    ("CourierNewPSMT", "Courier"),
];

/// Look up standard metrics by `/BaseFont`, ignoring a subset tag
/// such as `ABCDEF+`.
pub fn core_metrics(base_font: &str) -> Option<&'static CoreMetrics> {
    let name = match base_font.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => {
            rest
        }
        _ => base_font,
    };
    let name = ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map_or(name, |&(_, canonical)| canonical);

    CORE_FONTS.iter().find(|m| m.name == name)
}
