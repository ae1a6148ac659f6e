//! Static Helvetica advance widths for line wrapping.
//!
//! Widths are in em units (AFM units / 1000). Table covers ASCII 0x20..=0x7E (95 printable
//! characters); index = (char as usize) - 32. Anything else falls back to the average.

const PT_PER_MM: f32 = 72.0 / 25.4;

#[rustfmt::skip]
const HELVETICA_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '
    0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191,
    // (      )      *      +      ,      -      .      /
    0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
    // 0-9
    0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
    // :      ;      <      =      >      ?      @
    0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
    // A-Z
    0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
    0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
    // [      \      ]      ^      _      `
    0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
    // a-z
    0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
    0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
    // {      |      }      ~
    0.334, 0.260, 0.334, 0.584,
];

const AVERAGE_CHAR_WIDTH: f32 = 0.556;

/// Width of `c` in em units.
pub fn char_width_em(c: char) -> f32 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_CHAR_WIDTH
    }
}

/// Rendered width of `s` in millimetres at `font_size_pt`.
pub fn measure_mm(s: &str, font_size_pt: f32) -> f32 {
    let em: f32 = s.chars().map(char_width_em).sum();
    em * font_size_pt / PT_PER_MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_anchors() {
        assert_eq!(char_width_em(' '), 0.278);
        assert_eq!(char_width_em('0'), 0.556);
        assert_eq!(char_width_em('A'), 0.667);
        assert_eq!(char_width_em('W'), 0.944);
        assert_eq!(char_width_em('i'), 0.222);
        assert_eq!(char_width_em('~'), 0.584);
        assert_eq!(char_width_em('é'), AVERAGE_CHAR_WIDTH);
    }

    #[test]
    fn test_measure_scales_with_font_size() {
        let small = measure_mm("Fluffy", 10.0);
        let large = measure_mm("Fluffy", 20.0);
        assert!((large - 2.0 * small).abs() < 1e-4);
    }

    #[test]
    fn test_one_em_at_72pt_is_one_inch() {
        // 'W' is 0.944em; a full em at 72pt is 25.4mm.
        let w = measure_mm("W", 72.0);
        assert!((w - 0.944 * 25.4).abs() < 1e-3, "Width was {w}");
    }
}
