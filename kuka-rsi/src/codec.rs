//! Inbound sensor-frame parsing and outbound correction-frame rendering.
//!
//! The wire format is a fixed, known XML schema, not arbitrary documents,
//! so a general XML library is both overkill and jitter-hostile at 4 ms
//! cycles. Parsing here is tag-locator / attribute-locator based: find the
//! opening substring of a tag, then for each attribute find `NAME="` and
//! read the floating-point prefix that follows the quote.

use crate::state::{CartesianCorrection, CartesianPosition, JointPosition};

const TAG_RIST: &str = "<RIst";
const TAG_AIPOS: &str = "<AIPos";
const TAG_IPOC_OPEN: &str = "<IPOC>";
const TAG_IPOC_CLOSE: &str = "</IPOC>";

/// Destination buffer for [`render`] is sized for the fixed outbound
/// template plus headroom for a long IPOC string; 512 bytes mirrors the
/// original's `RESPONSE_BUFFER_SIZE`.
pub const RESPONSE_BUFFER_SIZE: usize = 512;

/// A sensor frame successfully parsed far enough to be worth replying to.
///
/// `cartesian` and `joints` are `None` when their respective top-level
/// element (`<RIst>`, `<AIPos>`) was absent from the frame — the frame is
/// still answered, but that position is not updated and the data callback
/// is not invoked (it requires both).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFrame<'a> {
    pub cartesian: Option<CartesianPosition>,
    pub joints: Option<JointPosition>,
    pub ipoc_value: u32,
    /// The literal byte sequence between `<IPOC>` and `</IPOC>`, echoed
    /// verbatim into the reply. Never re-rendered from `ipoc_value`,
    /// which would lose leading zeros the robot may be sensitive to.
    pub ipoc_text: &'a str,
}

/// Parse one inbound datagram. Returns `None` when `<IPOC>` is missing or
/// its body fails to parse as an unsigned decimal integer — per the
/// protocol contract, such a frame is dropped entirely: no reply, no
/// state update, no statistics increment.
pub fn parse(xml: &str) -> Option<ParsedFrame<'_>> {
    let ipoc_text = extract_ipoc_text(xml)?;
    let ipoc_value: u32 = ipoc_text.parse().ok()?;

    let cartesian = parse_cartesian(xml, ipoc_value);
    let joints = parse_joints(xml, ipoc_value);

    Some(ParsedFrame { cartesian, joints, ipoc_value, ipoc_text })
}

fn extract_ipoc_text(xml: &str) -> Option<&str> {
    let start = xml.find(TAG_IPOC_OPEN)? + TAG_IPOC_OPEN.len();
    let rest = &xml[start..];
    let end = rest.find(TAG_IPOC_CLOSE)?;
    Some(&rest[..end])
}

fn parse_cartesian(xml: &str, ipoc: u32) -> Option<CartesianPosition> {
    let tag_start = xml.find(TAG_RIST)?;
    let tag = &xml[tag_start..];
    Some(CartesianPosition {
        x: parse_attr(tag, "X"),
        y: parse_attr(tag, "Y"),
        z: parse_attr(tag, "Z"),
        a: parse_attr(tag, "A"),
        b: parse_attr(tag, "B"),
        c: parse_attr(tag, "C"),
        timestamp_us: crate::clock::now_us(),
        ipoc,
    })
}

fn parse_joints(xml: &str, ipoc: u32) -> Option<JointPosition> {
    let tag_start = xml.find(TAG_AIPOS)?;
    let tag = &xml[tag_start..];
    Some(JointPosition {
        axis: [
            parse_attr(tag, "A1"),
            parse_attr(tag, "A2"),
            parse_attr(tag, "A3"),
            parse_attr(tag, "A4"),
            parse_attr(tag, "A5"),
            parse_attr(tag, "A6"),
        ],
        timestamp_us: crate::clock::now_us(),
        ipoc,
    })
}

/// Find `name="` within `tag` and read the floating-point prefix that
/// follows the opening quote. Missing attributes default to `0.0`, and a
/// present-but-unparsable value does too — the original's `atof` never
/// fails, it just stops at the first non-numeric character (or returns
/// `0.0` for none at all), so the Rust port matches that by falling back
/// to a best-effort numeric-prefix scan instead of propagating an error.
fn parse_attr(tag: &str, name: &str) -> f64 {
    let needle = format!("{name}=\"");
    // Attribute names are not substrings of each other's followed text in
    // this schema (e.g. "A" vs "A1") only because every search anchors on
    // the full `name="` including the quote, so `A="` never matches inside
    // `A1="`.
    let Some(pos) = tag.find(&needle) else { return 0.0 };
    let value_start = pos + needle.len();
    let rest = &tag[value_start..];

    let numeric_len = rest
        .char_indices()
        .take_while(|&(i, c)| {
            c.is_ascii_digit() || c == '.' || ((c == '-' || c == '+') && i == 0)
        })
        .count();

    rest[..numeric_len].parse().unwrap_or(0.0)
}

/// Render the outbound correction frame into a fixed 512-byte buffer.
///
/// Returns `None` only if the rendered frame would not fit the buffer,
/// which cannot happen for the fixed template with any `f64` correction
/// and a reasonably sized IPOC, but is checked rather than assumed.
pub fn render(correction: &CartesianCorrection, ipoc_text: &str) -> Option<String> {
    let frame = format!(
        "<Sen Type=\"ImFree\">\n\
         <EStr>RSI Monitor</EStr>\n\
         <RKorr X=\"{:.4}\" Y=\"{:.4}\" Z=\"{:.4}\" A=\"{:.4}\" B=\"{:.4}\" C=\"{:.4}\" />\n\
         <IPOC>{}</IPOC>\n\
         </Sen>",
        correction.x, correction.y, correction.z, correction.a, correction.b, correction.c,
        ipoc_text,
    );

    if frame.len() > RESPONSE_BUFFER_SIZE {
        return None;
    }
    Some(frame)
}
