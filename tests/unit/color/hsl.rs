//! Tests for RGB to HSL conversion and color formatting

#[cfg(test)]
mod tests {
    use huegrid::color::hsl::{Rgb, rgb_to_hsl};

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    // Tests primary and secondary hues land on their sector boundaries
    // Verified by swapping the green and blue sector offsets
    #[test]
    fn test_primary_and_secondary_hues() {
        assert_close(Rgb::new(255, 0, 0).hue(), 0.0);
        assert_close(Rgb::new(255, 255, 0).hue(), 60.0);
        assert_close(Rgb::new(0, 255, 0).hue(), 120.0);
        assert_close(Rgb::new(0, 255, 255).hue(), 180.0);
        assert_close(Rgb::new(0, 0, 255).hue(), 240.0);
        assert_close(Rgb::new(255, 0, 255).hue(), 300.0);
    }

    // Tests achromatic colors report hue and saturation of zero
    // Verified by removing the max == min early return
    #[test]
    fn test_achromatic_colors() {
        for value in [0, 1, 128, 254, 255] {
            let hsl = rgb_to_hsl(Rgb::new(value, value, value));
            assert_close(hsl.hue, 0.0);
            assert_close(hsl.saturation, 0.0);
            assert_close(hsl.lightness, f64::from(value) / 255.0 * 100.0);
        }
    }

    // Tests saturation and lightness scaling for a fully saturated color
    // Verified by dropping the factor of 100
    #[test]
    fn test_saturation_and_lightness_scale() {
        let hsl = Rgb::new(255, 0, 0).to_hsl();
        assert_close(hsl.saturation, 100.0);
        assert_close(hsl.lightness, 50.0);

        let light = Rgb::new(255, 128, 128).to_hsl();
        assert!(light.lightness > 50.0);
        assert!(light.saturation > 0.0 && light.saturation <= 100.0);
    }

    // Tests red-dominant colors with blue above green wrap into [300, 360)
    // Verified by removing the +6 sector correction
    #[test]
    fn test_hue_wraps_below_red() {
        let hue = Rgb::new(255, 0, 64).hue();
        assert!((300.0..360.0).contains(&hue), "hue {hue} out of range");
    }

    // Tests every hue stays in [0, 360)
    // Verified by removing rem_euclid
    #[test]
    fn test_hue_range() {
        for r in (0..=255).step_by(51) {
            for g in (0..=255).step_by(51) {
                for b in (0..=255).step_by(51) {
                    let hue = Rgb::new(r, g, b).hue();
                    assert!((0.0..360.0).contains(&hue), "rgb({r},{g},{b}) -> {hue}");
                }
            }
        }
    }

    // Tests colors render as CSS rgb() strings
    // Verified by swapping channel order in Display
    #[test]
    fn test_display() {
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "rgb(1, 2, 3)");
    }

    // Tests colors serialize as r/g/b objects
    // Verified by renaming a field
    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_string(&Rgb::new(10, 20, 30)).expect("serialize");
        assert_eq!(json, r#"{"r":10,"g":20,"b":30}"#);

        let parsed: Rgb = serde_json::from_str(r#"{"r":255,"g":0,"b":7}"#).expect("parse");
        assert_eq!(parsed, Rgb::new(255, 0, 7));
        assert!(serde_json::from_str::<Rgb>(r#"{"r":256,"g":0,"b":0}"#).is_err());
    }

    // Tests building a color from an RGBA pixel ignores alpha
    // Verified by reading channels from the wrong offsets
    #[test]
    fn test_from_rgba() {
        assert_eq!(Rgb::from_rgba([9, 8, 7, 0]), Rgb::new(9, 8, 7));
    }
}
