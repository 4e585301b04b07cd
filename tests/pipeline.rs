mod common;

mod tests {
    use core::num::NonZeroU16;

    use embassy_time::Duration;
    use myrtio_light_painter::gamma::correct_rgb;
    use myrtio_light_painter::{
        DeviceConfig, ImagePath, RenderError, RenderPipeline, Rgb, SliceStorage,
    };

    use crate::common::{RecordingOutput, bitmap, header, is_blank, solid};

    const MAX_LEDS: usize = 16;

    fn config(strip_length: u16, line_interval_ms: u64, path: &str) -> DeviceConfig {
        DeviceConfig {
            strip_length: NonZeroU16::new(strip_length).unwrap(),
            data_pin: 14,
            line_interval: Duration::from_millis(line_interval_ms),
            image_path: ImagePath::new(path).unwrap(),
        }
    }

    fn pipeline<'a>(
        files: &'a [(&'a str, &'a [u8])],
        output: RecordingOutput,
    ) -> RenderPipeline<SliceStorage<'a>, RecordingOutput, MAX_LEDS> {
        RenderPipeline::new(SliceStorage::new(files), output)
    }

    fn assert_cleaned_up(output: &RecordingOutput) {
        assert!(!output.attached);
        assert_eq!(output.detaches, 1);
        assert!(is_blank(output.last_frame().unwrap()));
    }

    #[test]
    fn test_render_small_image() {
        let data = solid(4, 2, (200, 100, 50));
        let files = [("/test.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        pipeline.render(&config(4, 10, "/test.bmp")).unwrap();

        let output = pipeline.strip().output();
        assert_eq!(output.attaches, vec![(14, 4)]);
        // Two rows plus the final clear
        assert_eq!(output.writes.len(), 3);
        let expected = correct_rgb(Rgb::new(200, 100, 50));
        for (_, frame) in &output.writes[..2] {
            assert_eq!(frame, &vec![expected; 4]);
        }
        let gap = output.writes[1].0.saturating_duration_since(output.writes[0].0);
        assert!(gap >= Duration::from_millis(10));
        assert_cleaned_up(output);
        assert!(!pipeline.strip().is_attached());
    }

    #[test]
    fn test_render_commits_each_row_in_file_order() {
        let data = bitmap(
            2,
            3,
            &[
                &[(255, 0, 0), (0, 0, 0)],
                &[(0, 255, 0), (0, 0, 0)],
                &[(0, 0, 255), (255, 255, 255)],
            ],
        );
        let files = [("/rows.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        pipeline.render(&config(5, 0, "rows.bmp")).unwrap();

        let frames = pipeline.strip().output().frames();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0][0], Rgb::new(255, 0, 0));
        assert_eq!(frames[1][0], Rgb::new(0, 255, 0));
        assert_eq!(frames[2][0], Rgb::new(0, 0, 255));
        assert_eq!(frames[2][1], Rgb::new(255, 255, 255));
        // Pixels past the image width stay dark
        for frame in &frames[..3] {
            assert_eq!(frame.len(), 5);
            assert!(is_blank(&frame[2..]));
        }
        assert!(is_blank(&frames[3]));
    }

    #[test]
    fn test_render_too_wide() {
        let data = solid(10, 2, (255, 255, 255));
        let files = [("/wide.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        assert_eq!(
            pipeline.render(&config(4, 10, "/wide.bmp")),
            Err(RenderError::ImageTooWide {
                width: 10,
                strip_length: 4
            })
        );
        let output = pipeline.strip().output();
        assert!(output.attaches.is_empty());
        assert!(output.writes.is_empty());
        assert_eq!(output.detaches, 0);
    }

    #[test]
    fn test_render_missing_image() {
        let files: [(&str, &[u8]); 0] = [];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        assert_eq!(
            pipeline.render(&config(4, 0, "/missing.bmp")),
            Err(RenderError::ImageUnavailable)
        );
        assert!(pipeline.strip().output().attaches.is_empty());
    }

    #[test]
    fn test_render_unsupported_images() {
        let mut bad_signature = solid(2, 2, (1, 2, 3));
        bad_signature[1] = b'A';
        let images = [
            bad_signature,
            header(2, 2, 2, 24, 0),
            header(2, 2, 1, 16, 0),
            header(2, 2, 1, 24, 3),
            header(2, 2, 1, 24, 0)[..30].to_vec(),
        ];
        for image in &images {
            let files = [("/bad.bmp", image.as_slice())];
            let mut pipeline = pipeline(&files, RecordingOutput::default());
            assert_eq!(
                pipeline.render(&config(4, 0, "/bad.bmp")),
                Err(RenderError::UnsupportedImage)
            );
            let output = pipeline.strip().output();
            assert!(output.attaches.is_empty());
            assert!(output.writes.is_empty());
        }
    }

    #[test]
    fn test_render_truncated_image() {
        let mut data = solid(4, 3, (255, 255, 255));
        data.truncate(data.len() - 6);
        let files = [("/short.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        assert_eq!(
            pipeline.render(&config(4, 0, "/short.bmp")),
            Err(RenderError::DecodeFailure { row: 2 })
        );
        let output = pipeline.strip().output();
        // Two complete rows, then the clear
        assert_eq!(output.writes.len(), 3);
        assert_cleaned_up(output);
    }

    #[test]
    fn test_render_attach_failure() {
        let data = solid(2, 2, (255, 255, 255));
        let files = [("/test.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::failing());

        assert_eq!(
            pipeline.render(&config(4, 0, "/test.bmp")),
            Err(RenderError::ImageUnavailable)
        );
        assert!(pipeline.strip().output().writes.is_empty());
        assert!(!pipeline.strip().is_attached());
    }

    #[test]
    fn test_render_strip_longer_than_buffer() {
        let data = solid(2, 1, (255, 255, 255));
        let files = [("/test.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        assert_eq!(
            pipeline.render(&config(MAX_LEDS as u16 + 1, 0, "/test.bmp")),
            Err(RenderError::ImageUnavailable)
        );
        assert!(pipeline.strip().output().attaches.is_empty());
    }

    #[test]
    fn test_render_zero_rows() {
        let data = header(3, 0, 1, 24, 0);
        let files = [("/empty.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        pipeline.render(&config(4, 0, "/empty.bmp")).unwrap();
        let output = pipeline.strip().output();
        assert_eq!(output.writes.len(), 1);
        assert_cleaned_up(output);
    }

    #[test]
    fn test_render_zero_width_rejected() {
        let data = header(0, 2, 1, 24, 0);
        let files = [("/narrow.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        assert_eq!(
            pipeline.render(&config(4, 0, "/narrow.bmp")),
            Err(RenderError::UnsupportedImage)
        );
        assert!(pipeline.strip().output().attaches.is_empty());
    }

    #[test]
    fn test_render_repeated_passes() {
        let data = solid(3, 2, (10, 10, 10));
        let files = [("/test.bmp", data.as_slice())];
        let mut pipeline = pipeline(&files, RecordingOutput::default());

        pipeline.render(&config(3, 0, "/test.bmp")).unwrap();
        pipeline.render(&config(3, 0, "/test.bmp")).unwrap();

        let output = pipeline.strip().output();
        assert_eq!(output.attaches.len(), 2);
        assert_eq!(output.detaches, 2);
        assert_eq!(output.writes.len(), 6);
    }
}
