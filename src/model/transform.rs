use nalgebra::{Matrix3, Rotation2, Translation2};

/// Local transform in radians.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub skew: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            skew: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Transform {
    pub fn to_matrix(&self) -> Matrix3<f32> {
        let translation: Matrix3<f32> = Translation2::new(self.x, self.y).into();
        let rotation: Matrix3<f32> = Rotation2::new(self.rotation).into();
        let scale = Matrix3::new(
            self.scale_x, 0.0, 0.0,
            0.0, self.scale_y, 0.0,
            0.0, 0.0, 1.0,
        );
        translation * rotation * scale
    }
}

pub fn normalize_radian(value: f32) -> f32 {
    let value = (value + std::f32::consts::PI) % std::f32::consts::TAU;
    if value > 0.0 {
        value - std::f32::consts::PI
    } else {
        value + std::f32::consts::PI
    }
}
