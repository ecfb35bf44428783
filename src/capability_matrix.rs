//! Line-oriented capability matrix used by the build system.
//!
//! Each non-empty, non-comment line describes one feature:
//!
//! ```text
//! <label>[ with <library>]: <true|false|yes|no>[ (dynamic module: <true|false|yes|no>)]
//! ```
//!
//! The label becomes the feature name. The matrix is only a serialization of
//! `FeatureTuple`s; the registry never searches this text.

use crate::catalog::CapabilityRegistry;
use crate::catalog::model::FeatureTuple;
use crate::error::{ParseError, RenderError};

const MODULE_MARKER: &str = "(dynamic module:";
const LIBRARY_SEPARATOR: &str = " with ";

/// Parse every feature line of a capability matrix.
///
/// Line numbers in errors are 1-based and count blank and comment lines.
pub fn parse_capability_matrix(text: &str) -> Result<Vec<FeatureTuple>, ParseError> {
    let mut tuples = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        tuples.push(parse_line(line, idx + 1)?);
    }
    Ok(tuples)
}

/// Render a registry back into matrix form, in declaration order.
///
/// Entries whose name or library would read back differently are refused
/// rather than written lossily, so the output always reparses to the same
/// tuples.
pub fn render_capability_matrix(registry: &CapabilityRegistry) -> Result<String, RenderError> {
    let mut out = String::new();
    for entry in registry.entries() {
        let name = entry.name().as_str();
        check_representable(name, entry.backing_library())?;
        out.push_str(name);
        if let Some(library) = entry.backing_library() {
            out.push_str(LIBRARY_SEPARATOR);
            out.push_str(library);
        }
        out.push_str(if entry.is_enabled() { ": true" } else { ": false" });
        if entry.stored_load_mode().is_dynamic() {
            out.push_str(" (dynamic module: true)");
        }
        out.push('\n');
    }
    Ok(out)
}

fn check_representable(name: &str, library: Option<&str>) -> Result<(), RenderError> {
    let reason = if name.starts_with('#') {
        Some("starts with '#' and would read as a comment")
    } else if name.contains(':') {
        Some("contains ':'")
    } else if name.contains(['\n', '\r']) {
        Some("spans more than one line")
    } else if library.is_none() && name.contains(LIBRARY_SEPARATOR) {
        Some("contains ' with ' but names no library")
    } else {
        match library {
            Some("") => Some("has an empty library name"),
            Some(lib) if lib.contains(char::is_whitespace) || lib.contains(':') => {
                Some("has a library name containing whitespace or ':'")
            }
            _ => None,
        }
    };
    match reason {
        Some(reason) => Err(RenderError::Unrepresentable {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn parse_line(line: &str, line_no: usize) -> Result<FeatureTuple, ParseError> {
    let (body, dynamic_module) = split_module_suffix(line, line_no)?;

    let Some((label, value)) = body.rsplit_once(':') else {
        return Err(ParseError::malformed_line(line_no, "missing ':' separator"));
    };
    let value = value.trim();
    let enabled = parse_flag(value)
        .ok_or_else(|| ParseError::malformed_line(line_no, format!("bad flag '{value}'")))?;

    let label = label.trim();
    let (name, library) = match label.rsplit_once(LIBRARY_SEPARATOR) {
        Some((name, library)) if !library.trim().is_empty() => {
            (name.trim(), Some(library.trim()))
        }
        _ => (label, None),
    };
    if name.is_empty() {
        return Err(ParseError::malformed_line(line_no, "empty feature label"));
    }

    Ok(FeatureTuple::new(name, enabled, library, dynamic_module))
}

fn split_module_suffix(line: &str, line_no: usize) -> Result<(&str, bool), ParseError> {
    let Some(start) = line.find(MODULE_MARKER) else {
        return Ok((line, false));
    };
    let suffix = &line[start + MODULE_MARKER.len()..];
    let Some(inner) = suffix.trim_end().strip_suffix(')') else {
        return Err(ParseError::malformed_line(
            line_no,
            "unterminated dynamic module marker",
        ));
    };
    let flag = parse_flag(inner.trim()).ok_or_else(|| {
        ParseError::malformed_line(line_no, format!("bad dynamic module flag '{}'", inner.trim()))
    })?;
    Ok((line[..start].trim_end(), flag))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::model::{DescriptorSource, RawTriple};
    use crate::parser::DescriptorParser;

    // Build-time matrix of a full 8.17.1 build, exactly as the build system emits it.
    const FULL_BUILD_MATRIX: &str = concat!(
        "enable debug: false\n",
        "enable deprecated: false\n",
        "enable modules: true\n",
        "enable C++ binding: true\n",
        "enable RAD load/save: true\n",
        "enable Analyze7 load: true\n",
        "enable PPM load/save: true\n",
        "enable GIF load: true\n",
        "FFTs with fftw3: true\n",
        "SIMD support with libhwy: true\n",
        "ICC profile support with lcms2: true\n",
        "deflate compression with zlib: true\n",
        "text rendering with pangocairo: true\n",
        "font file support with fontconfig: true\n",
        "EXIF metadata support with libexif: true\n",
        "JPEG load/save with libjpeg: true\n",
        "JXL load/save with libjxl: true (dynamic module: true)\n",
        "JPEG2000 load/save with libopenjp2: true\n",
        "PNG load/save with spng: true\n",
        "image quantisation with imagequant: true\n",
        "TIFF load/save with libtiff-4: true\n",
        "image pyramid save with libarchive: true\n",
        "HEIC/AVIF load/save with libheif: true (dynamic module: false)\n",
        "WebP load/save with libwebp: true\n",
        "PDF load with poppler-glib: true (dynamic module: true)\n",
        "SVG load with librsvg-2.0: true\n",
        "EXR load with OpenEXR: true\n",
        "WSI load with openslide: true (dynamic module: true)\n",
        "Matlab load with matio: true\n",
        "NIfTI load/save with niftiio: true\n",
        "FITS load/save with cfitsio: true\n",
        "GIF save with cgif: true\n",
        "Magick load/save with MagickCore: true (dynamic module: true)",
    );

    fn registry_of(features: Vec<FeatureTuple>) -> CapabilityRegistry {
        DescriptorParser::parse(&DescriptorSource {
            release: RawTriple(8, 17, 1),
            abi: RawTriple(61, 1, 19),
            deprecated_api: false,
            features,
        })
        .unwrap()
    }

    #[test]
    fn parses_full_build_matrix() {
        let tuples = parse_capability_matrix(FULL_BUILD_MATRIX).unwrap();
        assert_eq!(tuples.len(), 33);
        assert_eq!(tuples[0], FeatureTuple::new("enable debug", false, None, false));
        assert_eq!(tuples[3], FeatureTuple::new("enable C++ binding", true, None, false));
        assert_eq!(
            tuples[16],
            FeatureTuple::new("JXL load/save", true, Some("libjxl"), true)
        );
        assert_eq!(
            tuples[22],
            FeatureTuple::new("HEIC/AVIF load/save", true, Some("libheif"), false)
        );
        assert_eq!(
            tuples[32],
            FeatureTuple::new("Magick load/save", true, Some("MagickCore"), true)
        );
        let dynamic: Vec<&str> = tuples
            .iter()
            .filter(|t| t.dynamic_module)
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(dynamic, ["JXL load/save", "PDF load", "WSI load", "Magick load/save"]);
    }

    #[test]
    fn full_build_matrix_renders_back_unchanged() {
        let tuples = parse_capability_matrix(FULL_BUILD_MATRIX).unwrap();
        let rendered = render_capability_matrix(&registry_of(tuples.clone())).unwrap();
        assert_eq!(parse_capability_matrix(&rendered).unwrap(), tuples);
    }

    #[test]
    fn awkward_but_representable_names_round_trip() {
        let tuples = vec![
            FeatureTuple::new("text rendering with fonts", true, Some("pangocairo"), false),
            FeatureTuple::new("C# bindings", false, None, true),
            FeatureTuple::new("with", true, Some("with"), false),
        ];
        let rendered = render_capability_matrix(&registry_of(tuples.clone())).unwrap();
        assert_eq!(parse_capability_matrix(&rendered).unwrap(), tuples);
    }

    #[test]
    fn refuses_entries_that_would_not_read_back() {
        let cases = [
            FeatureTuple::new("text rendering with pangocairo", true, None, false),
            FeatureTuple::new("#internal", true, None, false),
            FeatureTuple::new("PNG: legacy", true, None, false),
            FeatureTuple::new("PNG", true, Some(""), false),
            FeatureTuple::new("PNG", true, Some("with spng"), false),
            FeatureTuple::new("PNG", true, Some("a:b"), false),
        ];
        for tuple in cases {
            let name = tuple.name.clone();
            let err = render_capability_matrix(&registry_of(vec![tuple])).unwrap_err();
            let RenderError::Unrepresentable { name: rejected, .. } = &err;
            assert_eq!(*rejected, name, "{err}");
        }
    }

    #[test]
    fn parses_library_and_module_marker() {
        let tuples = parse_capability_matrix(
            "JXL load/save with libjxl: true (dynamic module: true)\n\
             HEIC/AVIF load/save with libheif: yes\n\
             enable debug: false\n",
        )
        .unwrap();
        assert_eq!(
            tuples,
            vec![
                FeatureTuple::new("JXL load/save", true, Some("libjxl"), true),
                FeatureTuple::new("HEIC/AVIF load/save", true, Some("libheif"), false),
                FeatureTuple::new("enable debug", false, None, false),
            ]
        );
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let tuples = parse_capability_matrix("# generated\n\n  PNG load/save with libpng: true  \n")
            .unwrap();
        assert_eq!(tuples.len(), 1);
        assert_eq!(tuples[0].library.as_deref(), Some("libpng"));
    }

    #[test]
    fn last_with_separates_library() {
        let tuples =
            parse_capability_matrix("text rendering with fonts with pangocairo: true").unwrap();
        assert_eq!(tuples[0].name, "text rendering with fonts");
        assert_eq!(tuples[0].library.as_deref(), Some("pangocairo"));
    }

    #[test]
    fn reports_line_numbers_for_malformed_lines() {
        let err = parse_capability_matrix("PNG: true\n\nJPEG load maybe\n").unwrap_err();
        assert!(matches!(err, ParseError::MalformedMatrixLine { line: 3, .. }));

        let err = parse_capability_matrix("PNG: perhaps").unwrap_err();
        assert!(matches!(err, ParseError::MalformedMatrixLine { line: 1, .. }));

        let err = parse_capability_matrix("JXL: true (dynamic module: true").unwrap_err();
        assert!(matches!(err, ParseError::MalformedMatrixLine { line: 1, .. }));

        let err = parse_capability_matrix(": true").unwrap_err();
        assert!(matches!(err, ParseError::MalformedMatrixLine { line: 1, .. }));
    }
}
