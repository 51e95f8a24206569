//! Tests for session state: ingestion, ordering, interaction modes and persistence

#[cfg(test)]
mod tests {
    use huegrid::SorterError;
    use huegrid::color::hsl::Rgb;
    use huegrid::color::sampler::{DisplayRect, PointerPosition};
    use huegrid::grid::layout::{CellSize, GridConfig};
    use huegrid::io::configuration::MAX_IMAGES;
    use huegrid::io::decode::{DecodedImage, EncodedImage};
    use huegrid::library::record::{RecordId, Weight};
    use huegrid::library::session::{InteractionMode, Session};
    use huegrid::ordering::sort::HueDirection;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const GREEN: [u8; 4] = [0, 255, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];

    fn decoded(name: &str, pixel: [u8; 4]) -> DecodedImage {
        let raster = RgbaImage::from_pixel(4, 4, Rgba(pixel));
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

    // Left half `left`, right half `right`
    fn two_tone(name: &str, left: [u8; 4], right: [u8; 4]) -> DecodedImage {
        let raster =
            RgbaImage::from_fn(4, 4, |x, _| if x < 2 { Rgba(left) } else { Rgba(right) });
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

    // Blue, red, green in ingestion order
    fn session_with_three() -> (Session, [RecordId; 3]) {
        let mut session = Session::new();
        let ids = session
            .ingest_all(vec![
                decoded("blue.png", BLUE),
                decoded("red.png", RED),
                decoded("green.png", GREEN),
            ])
            .expect("ingest");
        let ids: [RecordId; 3] = ids.try_into().expect("three ids");
        (session, ids)
    }

    fn display_names(session: &Session) -> Vec<String> {
        session
            .display_order()
            .iter()
            .map(|record| record.name().to_string())
            .collect()
    }

    // Tests identifiers are unique and never reused after deletion
    // Verified by reusing the count of records as the next id
    #[test]
    fn test_ids_unique() {
        let (mut session, ids) = session_with_three();
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[1], ids[2]);

        session.delete(&[ids[2]]);
        let next = session.ingest(decoded("again.png", RED)).expect("ingest");
        assert!(!ids.contains(&next));
    }

    // Tests the record cap rejects whole batches
    // Verified by accepting the part of the batch that fits
    #[test]
    fn test_capacity_limit() {
        let mut session = Session::new();
        let batch: Vec<DecodedImage> = (0..MAX_IMAGES - 1)
            .map(|i| decoded(&format!("{i}.png"), RED))
            .collect();
        session.ingest_all(batch).expect("fits");

        let overflow = vec![decoded("a.png", RED), decoded("b.png", RED)];
        assert!(matches!(
            session.ingest_all(overflow),
            Err(SorterError::CapacityExceeded {
                current: 59,
                incoming: 2,
                limit: 60,
            })
        ));
        assert_eq!(session.len(), MAX_IMAGES - 1);

        session.ingest(decoded("last.png", RED)).expect("fits");
        assert!(session.ingest(decoded("extra.png", RED)).is_err());
        assert_eq!(session.len(), MAX_IMAGES);
    }

    // Tests processing an empty session is refused
    // Verified by returning an empty ordering
    #[test]
    fn test_process_empty() {
        let mut session = Session::new();
        assert!(session.is_empty());
        assert!(matches!(
            session.process(),
            Err(SorterError::Precondition { .. })
        ));
        assert!(!session.is_processed());
    }

    // Tests unprocessed sessions show ingestion order, processed ones sorted order
    // Verified by sorting on ingest
    #[test]
    fn test_display_order_before_and_after_process() {
        let (mut session, _) = session_with_three();
        assert_eq!(display_names(&session), ["blue.png", "red.png", "green.png"]);
        assert!(session.sorted_view().is_none());

        assert_eq!(session.process().expect("process").len(), 3);
        assert_eq!(display_names(&session), ["red.png", "green.png", "blue.png"]);
    }

    // Tests weight, direction and color changes re-sort immediately once processed
    // Verified by skipping the refresh after a mutation
    #[test]
    fn test_mutations_resort() {
        let (mut session, [blue, red, _]) = session_with_three();
        session.process().expect("process");

        session.set_weight(blue, Weight::new(5).expect("valid")).expect("known");
        assert_eq!(display_names(&session), ["blue.png", "red.png", "green.png"]);

        session.set_direction(HueDirection::Descending);
        assert_eq!(display_names(&session), ["blue.png", "green.png", "red.png"]);

        session.set_color(red, Rgb::new(0, 255, 255)).expect("known");
        assert_eq!(display_names(&session), ["blue.png", "red.png", "green.png"]);

        session.set_weight(blue, Weight::new(1).expect("valid")).expect("known");
        let ingested = session.ingest(decoded("magenta.png", [255, 0, 255, 255])).expect("ingest");
        assert_eq!(session.sorted_view().expect("sorted").position(ingested), Some(0));
        assert_eq!(display_names(&session).last().map(String::as_str), Some("blue.png"));
    }

    // Tests the grid shows only its capacity, changing with rows and columns
    // Verified by ignoring rows in capacity
    #[test]
    fn test_visible_records() {
        let (mut session, _) = session_with_three();
        session.process().expect("process");

        session.set_rows(1).expect("valid");
        session.set_cols(2).expect("valid");
        let records = session.visible_records();
        let visible: Vec<&str> = records.iter().map(|r| r.name()).collect();
        assert_eq!(visible, ["red.png", "green.png"]);

        assert!(session.set_rows(0).is_err());
        assert!(session.set_gap(51).is_err());
        session.set_gap(0).expect("valid");
        assert_eq!(session.config().rows(), 1);
        assert_eq!(session.config().gap(), 0);

        session.set_config(GridConfig::default());
        assert_eq!(session.visible_records().len(), 3);
    }

    // Tests the weight editor opens, closes and is replaced by picking
    // Verified by leaving the editor open after choosing
    #[test]
    fn test_weight_editor() {
        let (mut session, [blue, red, _]) = session_with_three();

        assert_eq!(
            session.toggle_weight_editor(blue).expect("known"),
            InteractionMode::EditingWeight(blue)
        );
        assert_eq!(
            session.toggle_weight_editor(red).expect("known"),
            InteractionMode::EditingWeight(red)
        );
        assert_eq!(
            session.toggle_weight_editor(red).expect("known"),
            InteractionMode::Idle
        );

        session.toggle_weight_editor(blue).expect("known");
        session.choose_weight(blue, Weight::new(4).expect("valid")).expect("known");
        assert_eq!(session.mode(), InteractionMode::Idle);
        assert_eq!(session.record(blue).expect("known").weight().get(), 4);

        session.toggle_weight_editor(blue).expect("known");
        session.begin_pick(red).expect("pick");
        assert_eq!(session.mode(), InteractionMode::Picking(red));
    }

    // Tests previewing and committing a pick overrides color and re-sorts
    // Verified by committing the preview color instead of the sampled one
    #[test]
    fn test_pick_commit() {
        let (mut session, [blue, _, _]) = session_with_three();
        session.process().expect("process");

        let id = session.ingest(two_tone("split.png", GREEN, BLUE)).expect("ingest");
        let rect = DisplayRect::at_origin(40.0, 40.0);
        session.begin_pick(id).expect("pick");

        let preview = session
            .preview_pick(PointerPosition::new(5.0, 5.0), rect)
            .expect("preview");
        assert_eq!(preview, Some(Rgb::new(0, 255, 0)));
        assert_eq!(session.preview(), preview);

        let committed = session
            .commit_pick(PointerPosition::new(35.0, 5.0), rect)
            .expect("commit");
        assert_eq!(committed, Rgb::new(0, 0, 255));
        assert_eq!(session.record(id).expect("known").color(), Rgb::new(0, 0, 255));
        assert_eq!(session.mode(), InteractionMode::Idle);
        assert_eq!(session.preview(), None);

        let view = session.sorted_view().expect("sorted");
        assert_eq!(view.position(id), Some(3));
        assert_eq!(view.position(blue), Some(2));
    }

    // Tests cancelling or committing without a pick leaves colors alone
    // Verified by committing while idle
    #[test]
    fn test_pick_cancel_and_idle_commit() {
        let (mut session, [blue, _, _]) = session_with_three();
        let before = session.record(blue).expect("known").color();
        let rect = DisplayRect::at_origin(4.0, 4.0);

        assert!(matches!(
            session.commit_pick(PointerPosition::new(1.0, 1.0), rect),
            Err(SorterError::Precondition { .. })
        ));
        assert_eq!(
            session.preview_pick(PointerPosition::new(1.0, 1.0), rect).expect("idle"),
            None
        );

        session.begin_pick(blue).expect("pick");
        session
            .preview_pick(PointerPosition::new(1.0, 1.0), rect)
            .expect("preview");
        session.cancel_pick();

        assert_eq!(session.mode(), InteractionMode::Idle);
        assert_eq!(session.preview(), None);
        assert_eq!(session.record(blue).expect("known").color(), before);
    }

    // Tests picking rebuilds a released raster from the stored source
    // Verified by failing when no raster is resident
    #[test]
    fn test_pick_after_release() {
        let (mut session, [_, red, _]) = session_with_three();
        assert!(session.release_raster(red).expect("known"));
        assert!(session.record(red).expect("known").raster().is_none());

        session.begin_pick(red).expect("pick");
        let color = session
            .commit_pick(PointerPosition::new(0.0, 0.0), DisplayRect::at_origin(4.0, 4.0))
            .expect("commit");
        assert_eq!(color, Rgb::new(255, 0, 0));
    }

    // Tests selection toggles, freezes while picking, and deletes
    // Verified by allowing selection changes while picking
    #[test]
    fn test_selection_and_delete_selected() {
        let (mut session, [blue, red, green]) = session_with_three();
        session.process().expect("process");

        assert!(session.toggle_selection(blue).expect("known"));
        assert!(session.toggle_selection(green).expect("known"));
        assert!(!session.toggle_selection(green).expect("known"));
        assert!(session.toggle_selection(green).expect("known"));

        session.begin_pick(red).expect("pick");
        assert!(!session.toggle_selection(red).expect("known"));
        assert!(!session.selection().contains(&red));
        session.cancel_pick();

        let deleted = session.delete_selected();
        assert_eq!(deleted.len(), 2);
        assert!(session.selection().is_empty());
        assert_eq!(session.len(), 1);
        assert_eq!(session.sorted_view().expect("sorted").ids(), &[red]);
        assert_eq!(display_names(&session), ["red.png"]);
    }

    // Tests deleting the active record resets the interaction mode
    // Verified by leaving the mode pointing at a deleted record
    #[test]
    fn test_delete_resets_mode() {
        let (mut session, [blue, red, _]) = session_with_three();

        session.begin_pick(blue).expect("pick");
        assert_eq!(session.delete(&[blue, RecordId::new(999)]), vec![blue]);
        assert_eq!(session.mode(), InteractionMode::Idle);

        session.toggle_weight_editor(red).expect("known");
        session.delete(&[red]);
        assert_eq!(session.mode(), InteractionMode::Idle);

        assert!(session.delete(&[RecordId::new(999)]).is_empty());
    }

    // Tests unknown identifiers are reported
    // Verified by silently ignoring unknown ids
    #[test]
    fn test_unknown_record() {
        let (mut session, _) = session_with_three();
        let missing = RecordId::new(42);

        assert!(session.record(missing).is_none());
        assert!(matches!(
            session.set_weight(missing, Weight::default()),
            Err(SorterError::UnknownRecord { .. })
        ));
        assert!(session.begin_pick(missing).is_err());
        assert!(session.toggle_selection(missing).is_err());
        assert!(session.toggle_weight_editor(missing).is_err());
    }

    // Tests snapshots restore settings and re-apply saved entries by name
    // Verified by matching saved entries by id instead of name
    #[test]
    fn test_snapshot_and_restore() {
        let (mut session, [blue, _, _]) = session_with_three();
        session.set_rows(2).expect("valid");
        session.set_direction(HueDirection::Descending);
        session.set_weight(blue, Weight::new(5).expect("valid")).expect("known");
        session.set_color(blue, Rgb::new(1, 2, 3)).expect("known");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.images.len(), 3);

        let mut restored = Session::new();
        restored.restore(snapshot).expect("restore");
        assert_eq!(restored.config().rows(), 2);
        assert_eq!(restored.config().direction(), HueDirection::Descending);
        assert_eq!(restored.pending_restores().len(), 3);
        assert!(restored.is_empty());

        let id = restored.ingest(decoded("blue.png", BLUE)).expect("ingest");
        let record = restored.record(id).expect("known");
        assert_eq!(record.weight().get(), 5);
        assert_eq!(record.color(), Rgb::new(1, 2, 3));
        assert_eq!(restored.pending_restores().len(), 2);
    }

    // Tests exporting requires a processed, non-empty session
    // Verified by exporting ingestion order without processing
    #[tokio::test]
    async fn test_export() {
        let (mut session, _) = session_with_three();
        assert!(matches!(
            session.export(None).await,
            Err(SorterError::Precondition { .. })
        ));

        session.process().expect("process");
        session.set_rows(1).expect("valid");
        session.set_cols(2).expect("valid");
        session.set_gap(1).expect("valid");

        let exported = session
            .export(Some(CellSize::square(3).expect("valid")))
            .await
            .expect("export");
        let image = exported.image();
        assert_eq!(image.dimensions(), (7, 3));
        assert_eq!(image.get_pixel(0, 0), &Rgba(RED));
        assert_eq!(image.get_pixel(4, 0), &Rgba(GREEN));

        let default_cells = session.export(None).await.expect("export");
        assert_eq!(default_cells.image().dimensions(), (401, 200));
    }
}
