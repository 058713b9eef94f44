use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::Array4;

/// Converts an rgb8 image to a (1, 3, height, width) array with values scaled to [0, 1].
pub fn convert_rgb_image_to_owned_array(rgb_image: &RgbImage) -> Array4<f32> {
    let mut image_array = Array4::zeros((
        1,
        3,
        rgb_image.height() as usize,
        rgb_image.width() as usize,
    ));
    for (x, y, pixel) in rgb_image.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        let [r, g, b] = pixel.0;
        image_array[[0, 0, y, x]] = (r as f32) / 255.;
        image_array[[0, 1, y, x]] = (g as f32) / 255.;
        image_array[[0, 2, y, x]] = (b as f32) / 255.;
    }
    image_array
}

/// Resizes a tile to the model input resolution and lays it out for inference.
///
/// The tile is stretched, not letterboxed, so the decoder can scale boxes back with independent
/// x and y factors.
pub fn tile_to_model_input(tile: &RgbImage, input_width: u32, input_height: u32) -> Array4<f32> {
    if tile.dimensions() == (input_width, input_height) {
        return convert_rgb_image_to_owned_array(tile);
    }
    let resized = imageops::resize(tile, input_width, input_height, FilterType::Triangle);
    convert_rgb_image_to_owned_array(&resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn array_is_planar_and_normalised() {
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 1, Rgb([255, 0, 0]));
        img.put_pixel(1, 1, Rgb([0, 255, 0]));
        img.put_pixel(2, 0, Rgb([0, 0, 255]));

        let arr = convert_rgb_image_to_owned_array(&img);
        assert_eq!(arr.shape(), &[1, 3, 2, 3]);
        assert_eq!(
            (arr[[0, 0, 1, 0]], arr[[0, 1, 1, 0]], arr[[0, 2, 1, 0]]),
            (1.0, 0.0, 0.0)
        );
        assert_eq!(
            (arr[[0, 0, 1, 1]], arr[[0, 1, 1, 1]], arr[[0, 2, 1, 1]]),
            (0.0, 1.0, 0.0)
        );
        assert_eq!(
            (arr[[0, 0, 0, 2]], arr[[0, 1, 0, 2]], arr[[0, 2, 0, 2]]),
            (0.0, 0.0, 1.0)
        );
        assert_eq!(arr[[0, 0, 0, 0]], 0.0);
    }

    #[test]
    fn model_input_has_requested_size() {
        let img = RgbImage::from_pixel(50, 20, Rgb([255, 255, 255]));
        let arr = tile_to_model_input(&img, 64, 32);
        assert_eq!(arr.shape(), &[1, 3, 32, 64]);
        assert!(arr.iter().all(|v| (*v - 1.0).abs() < 1e-6));
    }
}
