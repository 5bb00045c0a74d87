use crate::Shape;

/// Rotate 90° clockwise.
///
/// An R×C shape becomes C×R, with `out[j][R - 1 - i] = in[i][j]`.
pub fn rotate_clockwise(shape: &Shape) -> Shape {
    let (height, width) = (shape.height(), shape.width());
    let mut rotated = vec![vec![false; height]; width];
    for (i, row) in shape.rows().iter().enumerate() {
        for (j, &cell) in row.iter().enumerate() {
            rotated[j][height - 1 - i] = cell;
        }
    }
    Shape::from_rows(rotated)
}
