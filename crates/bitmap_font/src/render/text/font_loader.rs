//! Bitmap font metrics file parser
//!
//! Parses the line-oriented text format written by common bitmap font
//! generators. Each line starts with a tag followed by `key=value` tokens:
//!
//! ```text
//! info face="Arial" size=32 bold=0
//! common lineHeight=36 base=28 scaleW=256 scaleH=256 pages=1
//! page id=0 file="arial_0.png"
//! char id=65 x=0 y=0 width=20 height=24 xoffset=0 yoffset=4 xadvance=21
//! kerning first=65 second=86 amount=-2
//! ```
//!
//! Tokens may appear in any order and a repeated key overwrites the earlier
//! value. Unknown tags and keys are ignored.

use super::font_atlas::{FontError, FontResult, GlyphAtlasMetrics, GlyphMetrics};

/// Highest number of atlas pages a metrics file may declare (page ids are 8-bit)
pub const MAX_PAGES: usize = 256;

/// Metrics file parser
pub struct FontLoader;

impl FontLoader {
    /// Parse metrics file contents into fully populated atlas metrics
    ///
    /// Fails if any recognized value is malformed or if the atlas-wide
    /// constants needed for layout are missing.
    pub fn parse(contents: &str) -> FontResult<GlyphAtlasMetrics> {
        let mut metrics = GlyphAtlasMetrics::default();

        for (line_index, line) in contents.lines().enumerate() {
            let line_num = line_index + 1;
            let mut tokens = Tokens::new(line.trim());

            let Some(tag) = tokens.next() else {
                continue;
            };
            let fields: Vec<(&str, &str)> = tokens
                .filter_map(|token| token.split_once('='))
                .map(|(key, value)| (key, unquote(value)))
                .collect();

            match tag {
                "info" => {
                    if let Some(size) = Self::last_int(&fields, "size", line_num)? {
                        // Negative sizes mean "match character height"; only the magnitude matters here.
                        metrics.rendered_size = size.unsigned_abs();
                    }
                },

                "common" => {
                    if let Some(value) = Self::last_int(&fields, "lineHeight", line_num)? {
                        metrics.line_height = value;
                    }
                    if let Some(value) = Self::last_int(&fields, "base", line_num)? {
                        metrics.baseline = value;
                    }
                    if let Some(value) = Self::last_int(&fields, "scaleW", line_num)? {
                        metrics.atlas_width = Self::non_negative(value, "scaleW", line_num)?;
                    }
                    if let Some(value) = Self::last_int(&fields, "scaleH", line_num)? {
                        metrics.atlas_height = Self::non_negative(value, "scaleH", line_num)?;
                    }
                },

                "page" => {
                    let id = Self::last_int(&fields, "id", line_num)?.unwrap_or(0);
                    let id = Self::page_id(id, line_num)?;
                    if let Some(file) = Self::last_value(&fields, "file") {
                        if metrics.pages.len() <= id {
                            metrics.pages.resize(id + 1, String::new());
                        }
                        metrics.pages[id] = file.to_string();
                    }
                },

                "char" => {
                    let id = Self::last_int(&fields, "id", line_num)?.unwrap_or(0);
                    let Some(code) = Self::glyph_code(id, "char", line_num) else {
                        continue;
                    };

                    let mut glyph = GlyphMetrics::default();
                    for &(key, value) in &fields {
                        let slot = match key {
                            "x" => &mut glyph.x,
                            "y" => &mut glyph.y,
                            "width" => &mut glyph.width,
                            "height" => &mut glyph.height,
                            "xoffset" => &mut glyph.x_offset,
                            "yoffset" => &mut glyph.y_offset,
                            "xadvance" => &mut glyph.x_advance,
                            _ => continue,
                        };
                        *slot = Self::parse_int(key, value, line_num)?;
                    }
                    metrics.set_glyph(code, glyph);
                },

                "kerning" => {
                    let first = Self::last_int(&fields, "first", line_num)?.unwrap_or(0);
                    let second = Self::last_int(&fields, "second", line_num)?.unwrap_or(0);
                    let amount = Self::last_int(&fields, "amount", line_num)?.unwrap_or(0);

                    if let (Some(first), Some(second)) = (
                        Self::glyph_code(first, "kerning", line_num),
                        Self::glyph_code(second, "kerning", line_num),
                    ) {
                        metrics.add_kerning(first, second, amount);
                    }
                },

                // chars/kernings counts and anything unrecognised
                _ => {}
            }
        }

        metrics.validate()?;
        Ok(metrics)
    }

    /// Last value given for `key` on a line
    fn last_value<'a>(fields: &[(&'a str, &'a str)], key: &str) -> Option<&'a str> {
        fields
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|&(_, value)| value)
    }

    /// Last value given for `key`, parsed as an integer
    fn last_int(fields: &[(&str, &str)], key: &str, line_num: usize) -> FontResult<Option<i32>> {
        Self::last_value(fields, key)
            .map(|value| Self::parse_int(key, value, line_num))
            .transpose()
    }

    fn parse_int(key: &str, value: &str, line_num: usize) -> FontResult<i32> {
        value.parse::<i32>().map_err(|_| FontError::Parse {
            line: line_num,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn non_negative(value: i32, key: &str, line_num: usize) -> FontResult<u32> {
        u32::try_from(value).map_err(|_| FontError::Parse {
            line: line_num,
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn page_id(id: i32, line_num: usize) -> FontResult<usize> {
        usize::try_from(id)
            .ok()
            .filter(|&id| id < MAX_PAGES)
            .ok_or_else(|| FontError::Parse {
                line: line_num,
                key: "id".to_string(),
                value: id.to_string(),
            })
    }

    /// Map an id onto the 256-slot table, skipping ids that do not fit
    fn glyph_code(id: i32, tag: &str, line_num: usize) -> Option<u8> {
        let code = u8::try_from(id).ok();
        if code.is_none() {
            log::warn!("Line {}: skipping {} id {} outside the glyph table", line_num, tag, id);
        }
        code
    }
}

/// Strip one pair of surrounding double quotes
fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Whitespace-separated tokens where double quotes group spaces into one token
struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Tokens<'a> {
    const fn new(line: &'a str) -> Self {
        Self { rest: line }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.rest = self.rest.trim_start();
        if self.rest.is_empty() {
            return None;
        }

        let mut in_quotes = false;
        let mut end = self.rest.len();
        for (index, ch) in self.rest.char_indices() {
            match ch {
                '"' => in_quotes = !in_quotes,
                c if c.is_whitespace() && !in_quotes => {
                    end = index;
                    break;
                },
                _ => {}
            }
        }

        let (token, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARIAL: &str = r#"
info face="Arial Black" size=32 bold=0 italic=0 charset="" unicode=0
common lineHeight=36 base=28 scaleW=256 scaleH=128 pages=1 packed=0
page id=0 file="arial_0.png"
chars count=3
char id=32 x=0 y=0 width=0 height=0 xoffset=0 yoffset=28 xadvance=8 page=0
char id=65 x=10 y=20 width=20 height=24 xoffset=-1 yoffset=4 xadvance=21 page=0
char id=86 x=40 y=20 width=19 height=24 xoffset=0 yoffset=4 xadvance=19 page=0
kernings count=2
kerning first=65 second=86 amount=-2
kerning first=86 second=65 amount=-3
"#;

    #[test]
    fn test_parse_atlas_constants() {
        let metrics = FontLoader::parse(ARIAL).unwrap();
        assert_eq!(metrics.rendered_size, 32);
        assert_eq!(metrics.line_height, 36);
        assert_eq!(metrics.baseline, 28);
        assert_eq!((metrics.atlas_width, metrics.atlas_height), (256, 128));
        assert_eq!(metrics.pages, vec!["arial_0.png".to_string()]);
    }

    #[test]
    fn test_parse_glyphs_and_kerning() {
        let metrics = FontLoader::parse(ARIAL).unwrap();
        let a = metrics.glyph(b'A').metrics;
        assert_eq!((a.x, a.y, a.width, a.height), (10, 20, 20, 24));
        assert_eq!((a.x_offset, a.y_offset, a.x_advance), (-1, 4, 21));
        assert_eq!(metrics.glyph(b' ').metrics.x_advance, 8);
        assert_eq!(metrics.glyph_count(), 3);

        assert_eq!(metrics.kerning(b'A', b'V'), Some(-2));
        assert_eq!(metrics.kerning(b'V', b'A'), Some(-3));
        assert_eq!(metrics.kerning(b'A', b'A'), None);
    }

    #[test]
    fn test_fields_in_any_order_last_assignment_wins() {
        let contents = "info size=16\ncommon scaleH=64 lineHeight=20 scaleW=64 base=15\n\
                        char xadvance=7 id=66 width=5 height=9 width=6\n";
        let metrics = FontLoader::parse(contents).unwrap();
        let b = metrics.glyph(b'B').metrics;
        assert_eq!(b.width, 6);
        assert_eq!(b.height, 9);
        assert_eq!(b.x_advance, 7);
    }

    #[test]
    fn test_negative_info_size_uses_magnitude() {
        let contents = "info size=-24\ncommon lineHeight=28 base=20 scaleW=64 scaleH=64\n";
        assert_eq!(FontLoader::parse(contents).unwrap().rendered_size, 24);
    }

    #[test]
    fn test_out_of_table_ids_are_skipped() {
        let contents = "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\n\
                        char id=300 x=1 y=1 width=4 height=4 xoffset=0 yoffset=0 xadvance=5\n\
                        kerning first=65 second=1024 amount=-1\n";
        let metrics = FontLoader::parse(contents).unwrap();
        assert_eq!(metrics.glyph_count(), 0);
        assert_eq!(metrics.kerning_pair_count(), 0);
    }

    #[test]
    fn test_malformed_value_reports_line() {
        let contents = "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\nchar id=65 width=wide\n";
        match FontLoader::parse(contents) {
            Err(FontError::Parse { line, key, value }) => {
                assert_eq!(line, 3);
                assert_eq!(key, "width");
                assert_eq!(value, "wide");
            },
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_common_line_is_rejected() {
        let err = FontLoader::parse("info size=16\nchar id=65 xadvance=4\n").unwrap_err();
        assert!(matches!(err, FontError::MissingField(_)));
    }

    #[test]
    fn test_quoted_values_with_spaces() {
        let tokens: Vec<&str> = Tokens::new(r#"info face="Times New Roman" size=12"#).collect();
        assert_eq!(tokens, vec!["info", r#"face="Times New Roman""#, "size=12"]);
        assert_eq!(unquote(r#""Times New Roman""#), "Times New Roman");
        assert_eq!(unquote("12"), "12");
    }

    #[test]
    fn test_page_file_with_spaces() {
        let contents = "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\n\
                        page id=1 file=\"second page.png\"\npage id=0 file=\"first.png\"\n";
        let metrics = FontLoader::parse(contents).unwrap();
        assert_eq!(metrics.pages, vec!["first.png".to_string(), "second page.png".to_string()]);
    }

    #[test]
    fn test_page_id_outside_page_range_is_rejected() {
        let contents = "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\n\
                        page id=2000000000 file=\"x.png\"\n";
        match FontLoader::parse(contents) {
            Err(FontError::Parse { line, key, value }) => {
                assert_eq!(line, 3);
                assert_eq!(key, "id");
                assert_eq!(value, "2000000000");
            },
            other => panic!("expected parse error, got {:?}", other),
        }

        let negative = "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\npage id=-1 file=\"x.png\"\n";
        assert!(matches!(FontLoader::parse(negative), Err(FontError::Parse { .. })));
    }

    #[test]
    fn test_last_page_id_is_accepted() {
        let contents = format!(
            "info size=16\ncommon lineHeight=20 base=15 scaleW=64 scaleH=64\npage id={} file=\"last.png\"\n",
            MAX_PAGES - 1
        );
        let metrics = FontLoader::parse(&contents).unwrap();
        assert_eq!(metrics.pages.len(), MAX_PAGES);
        assert_eq!(metrics.pages[MAX_PAGES - 1], "last.png");
    }
}
