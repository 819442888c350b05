//! Pixel read tests against on-disk Zarr pyramids.

use ngff_pixels::{
    min_max, ImageIdentity, PixelType, PixelsError, PixelsService, RegionError, StorageLocator,
};

use super::test_utils::*;

fn service() -> PixelsService {
    PixelsService::new(StorageLocator::local_only(), 256)
}

// =============================================================================
// Region reads
// =============================================================================

#[tokio::test]
async fn test_u8_region_matches_source() {
    let fixture = NgffFixture::new();
    let (level0, shape0) = two_level_u8_image(&fixture, None);
    let image = fixture.image(7, 0);

    let data = service()
        .pixel_data(&image, 0, "[0,0,0,100:150,200:260]")
        .await
        .unwrap();

    assert_eq!(data.pixel_type, PixelType::UInt8);
    assert_eq!(data.type_name(), "uint8");
    assert_eq!(data.data.len(), 3000);

    let expected = crop(&level0, shape0, [0, 0, 0, 100, 200], [1, 1, 1, 50, 60]);
    assert_eq!(&data.data[..], &expected[..]);
}

#[tokio::test]
async fn test_region_on_second_channel() {
    let fixture = NgffFixture::new();
    let (level0, shape0) = two_level_u8_image(&fixture, None);

    let data = service()
        .pixel_data(&fixture.image(7, 0), 0, "0,1,0,60:70,250:300")
        .await
        .unwrap();

    let expected = crop(&level0, shape0, [0, 1, 0, 60, 250], [1, 1, 1, 10, 50]);
    assert_eq!(&data.data[..], &expected[..]);
}

#[tokio::test]
async fn test_whole_array_read_skips_tile_limit() {
    let fixture = NgffFixture::new();
    let (level0, _) = two_level_u8_image(&fixture, None);

    // 300 wide is over the 256 limit, but whole-array reads are not tiles
    let data = service()
        .pixel_data(&fixture.image(7, 0), 0, "")
        .await
        .unwrap();
    assert_eq!(&data.data[..], &level0[..]);
}

#[tokio::test]
async fn test_u16_output_is_big_endian_for_either_source_order() {
    let fixture = NgffFixture::new();
    let shape = [1, 1, 1, 32, 40];
    let values = u16_values(shape);

    fixture.write_array("1.zarr/0/0", "<u2", &shape, &[1, 1, 1, 16, 16], &le_bytes_u16(&values));
    fixture.write_array("2.zarr/0/0", ">u2", &shape, &[1, 1, 1, 16, 16], &be_bytes_u16(&values));

    for fileset in [1, 2] {
        let data = service()
            .pixel_data(&fixture.image(fileset, 0), 0, "")
            .await
            .unwrap();
        assert_eq!(data.pixel_type, PixelType::UInt16);
        assert_eq!(data.len(), values.len());

        let decoded: Vec<u16> = data
            .data
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        assert_eq!(decoded, values);
    }
}

#[tokio::test]
async fn test_signed_16_bit_values() {
    let fixture = NgffFixture::new();
    let values: Vec<i16> = vec![-32768, -1, 0, 1, 32767, -300];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fixture.write_array("3.zarr/0/0", "<i2", &[1, 1, 1, 2, 3], &[1, 1, 1, 2, 3], &bytes);

    let data = service()
        .pixel_data(&fixture.image(3, 0), 0, "[0,0,0,0:2,0:3]")
        .await
        .unwrap();
    assert_eq!(data.pixel_type, PixelType::Int16);

    let expected: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
    assert_eq!(&data.data[..], &expected[..]);
    assert_eq!(min_max(&data.data, data.pixel_type).unwrap(), (-32768, 32767));
}

#[tokio::test]
async fn test_int64_is_extracted() {
    let fixture = NgffFixture::new();
    let values: Vec<i64> = vec![i64::MIN, -2, 0, 5, i64::MAX, 1 << 40];
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    fixture.write_array("4.zarr/0/0", "<i8", &[1, 1, 1, 2, 3], &[1, 1, 1, 2, 3], &bytes);

    let data = service()
        .pixel_data(&fixture.image(4, 0), 0, "")
        .await
        .unwrap();
    assert_eq!(data.pixel_type, PixelType::Int64);
    assert_eq!(data.data.len(), 48);

    let expected: Vec<u8> = values.iter().flat_map(|v| v.to_be_bytes()).collect();
    assert_eq!(&data.data[..], &expected[..]);
}

#[tokio::test]
async fn test_float_arrays_are_rejected() {
    let fixture = NgffFixture::new();
    let bytes: Vec<u8> = [0.5f32; 4].iter().flat_map(|v| v.to_le_bytes()).collect();
    fixture.write_array("5.zarr/0/0", "<f4", &[1, 1, 1, 2, 2], &[1, 1, 1, 2, 2], &bytes);

    let service = service();
    let image = fixture.image(5, 0);
    let err = service
        .pixel_data(&image, 0, "[0,0,0,0:1,0:1]")
        .await
        .unwrap_err();
    assert!(matches!(err, PixelsError::UnsupportedType(_)));
    assert!(err.is_invalid_argument());

    // The type is still reported
    assert_eq!(
        service.pixel_type(&image, 0).await.unwrap(),
        PixelType::Float32
    );
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_tile_over_limit_is_rejected() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);

    let err = service()
        .pixel_data(&fixture.image(7, 0), 0, "[0,0,0,0:10,0:300]")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PixelsError::Region(RegionError::TileTooLarge {
            width: 300,
            height: 10,
            max: 256
        })
    ));
}

#[tokio::test]
async fn test_malformed_selection_is_rejected() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);

    let err = service()
        .pixel_data(&fixture.image(7, 0), 0, "[0,0,100:150,200:260]")
        .await
        .unwrap_err();
    assert!(matches!(err, PixelsError::Region(RegionError::TermCount(4))));
}

#[tokio::test]
async fn test_region_out_of_bounds() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);

    let err = service()
        .pixel_data(&fixture.image(7, 0), 1, "[0,0,0,90:110,0:10]")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PixelsError::Region(RegionError::OutOfBounds { axis: 3, .. })
    ));
}

#[tokio::test]
async fn test_non_5d_array_is_rejected() {
    let fixture = NgffFixture::new();
    fixture.write_array("6.zarr/0/0", "|u1", &[4, 4], &[4, 4], &[0u8; 16]);

    let err = service()
        .pixel_data(&fixture.image(6, 0), 0, "")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PixelsError::Region(RegionError::Dimensionality(2))
    ));
}

#[tokio::test]
async fn test_missing_level_is_not_found() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);

    let err = service()
        .pixel_data(&fixture.image(7, 0), 2, "[0,0,0,0:1,0:1]")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_missing_root_is_not_found() {
    let fixture = NgffFixture::new();
    let image = ImageIdentity::new(fixture.path("absent").to_str().unwrap(), 7, 0);

    let err = service().pixel_data(&image, 0, "").await.unwrap_err();
    assert!(err.is_not_found());
}

// =============================================================================
// Levels and sizes
// =============================================================================

#[tokio::test]
async fn test_resolution_levels_ignore_non_numeric_children() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);
    fixture.mkdir("7.zarr/0/labels");
    fixture.mkdir("7.zarr/0/OME");

    let levels = service()
        .resolution_levels(&fixture.image(7, 0))
        .await
        .unwrap();
    assert_eq!(levels, 2);
}

#[tokio::test]
async fn test_sizes_and_descriptions() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);
    let image = fixture.image(7, 0);
    let service = service();

    assert_eq!(service.size_xy(&image, 0).await.unwrap(), (300, 200));
    assert_eq!(service.size_xy(&image, 1).await.unwrap(), (150, 100));
    assert_eq!(service.dim_size(&image, 0, 1).await.unwrap(), 2);
    assert!(service.dim_size(&image, 0, 5).await.is_err());
    assert_eq!(
        service.array_shape(&image, 1).await.unwrap(),
        vec![1, 2, 1, 100, 150]
    );
    assert_eq!(
        service.resolution_descriptions(&image).await.unwrap(),
        vec![(300, 200), (150, 100)]
    );
}

// =============================================================================
// Plates, labels, min/max
// =============================================================================

#[tokio::test]
async fn test_plate_image_read() {
    let fixture = NgffFixture::new();
    let shape = [1, 1, 1, 8, 8];
    let pixels = u8_pixels(shape);
    fixture.write_array("9.zarr/2/3/0/0", "|u1", &shape, &[1, 1, 1, 8, 8], &pixels);

    let service = service();
    let plate = fixture.image(9, 0).with_plate(2, 3);
    let data = service.pixel_data(&plate, 0, "[0,0,0,0:8,0:8]").await.unwrap();
    assert_eq!(&data.data[..], &pixels[..]);

    // The same fileset without plate coordinates has no data
    let plain = fixture.image(9, 0);
    assert!(service.pixel_data(&plain, 0, "").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_label_bytes() {
    let fixture = NgffFixture::new();
    two_level_u8_image(&fixture, None);

    let shape = [1, 1, 1, 20, 20];
    let mask = u8_pixels(shape);
    fixture.write_group("7.zarr/0/labels/abc", None);
    fixture.write_array("7.zarr/0/labels/abc/0", "|u1", &shape, &[1, 1, 1, 10, 10], &mask);

    let image = fixture.image(7, 0);
    let data = service()
        .label_bytes(&image, "abc", 0, "[0,0,0,5:15,5:15]")
        .await
        .unwrap();
    let expected = crop(&mask, shape, [0, 0, 0, 5, 5], [1, 1, 1, 10, 10]);
    assert_eq!(&data.data[..], &expected[..]);

    // Labels do not count as resolution levels
    assert_eq!(service().resolution_levels(&image).await.unwrap(), 2);
}

#[tokio::test]
async fn test_plane_min_max() {
    let fixture = NgffFixture::new();
    let shape = [1, 2, 1, 2, 3];
    let values: Vec<u16> = vec![
        10, 20, 30, 40, 50, 60, // c = 0
        7, 65535, 9, 1000, 2, 3, // c = 1
    ];
    fixture.write_array("8.zarr/0/0", "<u2", &shape, &[1, 1, 1, 2, 3], &le_bytes_u16(&values));

    let image = fixture.image(8, 0);
    let service = service();
    assert_eq!(service.plane_min_max(&image, 0, 0, 0, 0).await.unwrap(), (10, 60));
    assert_eq!(service.plane_min_max(&image, 0, 0, 1, 0).await.unwrap(), (2, 65535));
    assert!(service.plane_min_max(&image, 0, 0, 2, 0).await.is_err());
}
