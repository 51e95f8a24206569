//! Tests for record identity, weights and raster lifetime

#[cfg(test)]
mod tests {
    use huegrid::SorterError;
    use huegrid::color::hsl::Rgb;
    use huegrid::io::decode::{DecodedImage, EncodedImage};
    use huegrid::library::record::{ImageRecord, RecordId, Weight};
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn decoded(name: &str, width: u32, height: u32, pixel: [u8; 4]) -> DecodedImage {
        let raster = RgbaImage::from_pixel(width, height, Rgba(pixel));
        let mut buffer = Cursor::new(Vec::new());
        raster
            .write_to(&mut buffer, ImageFormat::Png)
            .expect("encode png");
        DecodedImage {
            name: name.to_string(),
            source: EncodedImage::from_bytes(name, buffer.into_inner()).expect("png source"),
            raster,
        }
    }

    // Tests weights outside 1..=5 are rejected
    // Verified by widening the accepted range
    #[test]
    fn test_weight_range() {
        for value in 1..=5 {
            assert_eq!(Weight::new(value).expect("valid").get(), value);
        }
        assert!(matches!(
            Weight::new(0),
            Err(SorterError::InvalidParameter {
                parameter: "weight",
                ..
            })
        ));
        assert!(Weight::new(6).is_err());
        assert!(Weight::try_from(9).is_err());
        assert_eq!(Weight::default().get(), 3);
        assert_eq!(u8::from(Weight::new(2).expect("valid")), 2);
    }

    // Tests weights serialize as bare numbers and validate on load
    // Verified by skipping try_from on deserialize
    #[test]
    fn test_weight_serde() {
        let weight: Weight = serde_json::from_str("4").expect("parse");
        assert_eq!(weight, Weight::new(4).expect("valid"));
        assert_eq!(serde_json::to_string(&weight).expect("serialize"), "4");
        assert!(serde_json::from_str::<Weight>("0").is_err());
    }

    // Tests identifiers display and serialize as plain numbers
    // Verified by serializing as a struct
    #[test]
    fn test_record_id() {
        let id = RecordId::new(7);
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "#7");
        assert_eq!(serde_json::to_string(&id).expect("serialize"), "7");
        assert!(RecordId::new(1) < RecordId::new(2));
    }

    // Tests new records extract their color and start at the default weight
    // Verified by leaving the color at the fallback
    #[test]
    fn test_new_record() {
        let record = ImageRecord::new(RecordId::new(1), decoded("sky.png", 12, 5, [30, 90, 200, 255]));

        assert_eq!(record.id(), RecordId::new(1));
        assert_eq!(record.name(), "sky.png");
        assert_eq!(record.dimensions(), (12, 5));
        assert_eq!(record.color(), Rgb::new(16, 80, 192));
        assert_eq!(record.weight(), Weight::default());
        assert!(record.raster().is_some());
        assert!((record.hue() - record.color().hue()).abs() < f64::EPSILON);
    }

    // Tests overrides replace color and weight without touching the raster
    // Verified by re-extracting on set_weight
    #[test]
    fn test_overrides() {
        let mut record = ImageRecord::new(RecordId::new(2), decoded("a.png", 2, 2, [1, 1, 1, 255]));
        record.set_color(Rgb::new(0, 255, 0));
        record.set_weight(Weight::new(5).expect("valid"));

        assert_eq!(record.color(), Rgb::new(0, 255, 0));
        assert!((record.hue() - 120.0).abs() < 1e-9);
        assert_eq!(record.weight().get(), 5);
        assert!(record.raster().is_some());
    }

    // Tests a released raster is rebuilt from the stored source
    // Verified by dropping the source together with the raster
    #[test]
    fn test_release_and_ensure_raster() {
        let mut record = ImageRecord::new(RecordId::new(3), decoded("b.png", 7, 3, [9, 8, 7, 255]));

        assert!(record.release_raster());
        assert!(!record.release_raster());
        assert!(record.raster().is_none());
        assert_eq!(record.dimensions(), (7, 3));

        let raster = record.ensure_raster().expect("decode");
        assert_eq!(raster.dimensions(), (7, 3));
        assert_eq!(raster.get_pixel(0, 0), &Rgba([9, 8, 7, 255]));
        assert!(record.raster().is_some());
        assert!(!record.source().bytes().is_empty());
    }

    // Tests a broken source reports which record failed
    // Verified by discarding the record context
    #[test]
    fn test_ensure_raster_failure() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend_from_slice(b"garbage");
        let mut record = ImageRecord::new(
            RecordId::new(4),
            DecodedImage {
                name: "bad.png".to_string(),
                source: EncodedImage::from_bytes("bad.png", bytes).expect("png magic"),
                raster: RgbaImage::new(1, 1),
            },
        );
        record.release_raster();

        assert!(matches!(
            record.ensure_raster(),
            Err(SorterError::Decode {
                record: Some(id),
                ..
            }) if id == RecordId::new(4)
        ));
    }
}
