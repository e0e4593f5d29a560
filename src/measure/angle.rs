//! 3点からの関節角度計算
//!
//! 頂点 p2 における p2→p1 と p2→p3 のなす角を内積から求める。

/// 頂点 `p2` の角度（度, 0〜180）
///
/// cos(θ) = (v1 · v2) / (|v1| × |v2|)
///
/// どちらかのベクトル長が0（点が重なっている）場合は 0.0 を返す。
/// 浮動小数誤差で ±1 を超えないよう cos はクランプする。
pub fn angle_at(p1: (f32, f32), p2: (f32, f32), p3: (f32, f32)) -> f32 {
    let v1 = (p1.0 - p2.0, p1.1 - p2.1);
    let v2 = (p3.0 - p2.0, p3.1 - p2.1);

    let dot = v1.0 * v2.0 + v1.1 * v2.1;
    let len1_sq = v1.0 * v1.0 + v1.1 * v1.1;
    let len2_sq = v2.0 * v2.0 + v2.1 * v2.1;

    if len1_sq == 0.0 || len2_sq == 0.0 {
        return 0.0;
    }

    // |v1||v2| = sqrt(|v1|²|v2|²): p1 == p3 のとき cos がちょうど 1 になる
    let cos_angle = (dot / (len1_sq * len2_sq).sqrt()).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}

/// 肩の外転角: 腰-肩-手首
pub fn shoulder_angle(hip: (f32, f32), shoulder: (f32, f32), wrist: (f32, f32)) -> f32 {
    angle_at(hip, shoulder, wrist)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at((0.5, 1.0), (0.5, 0.5), (1.0, 0.5));
        assert!(approx_eq(angle, 90.0, 1e-3));
    }

    #[test]
    fn test_straight_line() {
        let angle = angle_at((0.0, 0.0), (0.5, 0.0), (1.0, 0.0));
        assert!(approx_eq(angle, 180.0, 1e-3));
    }

    #[test]
    fn test_same_endpoint_is_zero() {
        let p1 = (0.2, 0.7);
        let p2 = (0.4, 0.3);
        assert_eq!(angle_at(p1, p2, p1), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let cases = [
            ((0.1, 0.9), (0.5, 0.5), (0.8, 0.2)),
            ((0.3, 0.3), (0.31, 0.7), (0.9, 0.72)),
            ((0.0, 1.0), (1.0, 0.0), (0.5, 0.5)),
        ];
        for (p1, p2, p3) in cases {
            assert_eq!(angle_at(p1, p2, p3), angle_at(p3, p2, p1));
        }
    }

    #[test]
    fn test_range_over_grid() {
        let p2 = (0.5, 0.5);
        for i in 0..10 {
            for j in 0..10 {
                let p1 = (i as f32 / 9.0, 0.1);
                let p3 = (0.9, j as f32 / 9.0);
                let angle = angle_at(p1, p2, p3);
                assert!((0.0..=180.0).contains(&angle), "angle {} out of range", angle);
            }
        }
    }

    #[test]
    fn test_degenerate_returns_zero() {
        assert_eq!(angle_at((0.5, 0.5), (0.5, 0.5), (0.9, 0.1)), 0.0);
        assert_eq!(angle_at((0.9, 0.1), (0.5, 0.5), (0.5, 0.5)), 0.0);
        assert_eq!(angle_at((0.5, 0.5), (0.5, 0.5), (0.5, 0.5)), 0.0);
    }

    #[test]
    fn test_arm_raised_45() {
        // 腰は真下、手首は斜め45度
        let hip = (0.5, 0.0);
        let shoulder = (0.5, 0.5);
        let wrist = (0.5 + 0.3 * 0.70710677, 0.5 - 0.3 * 0.70710677);
        assert!(approx_eq(shoulder_angle(hip, shoulder, wrist), 45.0, 1e-2));
    }
}
