use cgmath::{Matrix3, Matrix4, SquareMatrix};

/// Converts OpenGL clip-space depth (-1..1) to the 0..1 range wgpu expects
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    let mut result = [[0.0; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            result[i][j] = matrix4[i][j];
        }
    }

    result
}

/// Keeps only the rotational upper 3x3 block of a view matrix.
///
/// Geometry drawn with the result stays centred on the eye no matter where
/// the camera moves, which is what a skybox needs.
pub fn strip_translation(view: Matrix4<f32>) -> Matrix4<f32> {
    let rotation = Matrix3::from_cols(
        view.x.truncate(),
        view.y.truncate(),
        view.z.truncate(),
    );
    Matrix4::from(rotation)
}

/// Inverse-transpose of a model matrix, used to carry normals into world space
pub fn normal_matrix(model: Matrix4<f32>) -> Matrix4<f32> {
    use cgmath::Matrix;
    model
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or_else(Matrix4::identity)
}
