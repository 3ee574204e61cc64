use super::*;
use crate::render::surface::{DrawCall, RecordingSurface};

fn canvas() -> Canvas {
    Canvas::new(960, 500).unwrap()
}

#[test]
fn spawn_stays_within_configured_bounds() {
    let mut rng = Rng64::new(7);
    for _ in 0..500 {
        let p = DriftParticle::spawn(&mut rng, canvas());
        assert!((0.0..960.0).contains(&p.x));
        assert_eq!(p.y, 0.0);
        assert!((0.0..2.0 * PI).contains(&p.angle));
        assert!((1.5..3.5).contains(&p.size));
        assert!(p.radius >= 0.0 && p.radius <= 480.0);
        assert_eq!(p.lifetime, 0.0);
    }
}

#[test]
fn update_falls_by_size_and_orbits_center_line() {
    let mut p = DriftParticle {
        x: 0.0,
        y: 10.0,
        angle: 0.5,
        size: 2.0,
        radius: 100.0,
        lifetime: 0.0,
    };
    p.update(canvas());

    let expected_phase = 0.2 * 200.0 * 0.5;
    assert!((p.x - (480.0 + 100.0 * f64::sin(expected_phase))).abs() < 1e-9);
    assert_eq!(p.y, 12.0);
    assert!((p.lifetime - 0.02).abs() < 1e-12);

    p.update(canvas());
    assert_eq!(p.y, 14.0);
    assert!((p.lifetime - 0.04).abs() < 1e-12);
}

#[test]
fn culled_only_below_frame_and_never_done() {
    let mut p = DriftParticle {
        y: 499.0,
        size: 1.5,
        ..DriftParticle::default()
    };
    assert!(!p.is_culled(canvas()));
    p.update(canvas());
    assert!(p.is_culled(canvas()));
    assert!(!p.is_done());
}

#[test]
fn record_layout_is_fixed_and_little_endian() {
    let p = DriftParticle {
        x: 1.0,
        y: 2.0,
        angle: 3.0,
        size: 4.0,
        radius: 5.0,
        lifetime: 6.0,
    };
    let mut buf = Vec::new();
    p.encode(&mut buf);
    assert_eq!(buf.len(), DriftParticle::RECORD_SIZE);
    assert_eq!(&buf[0..8], &1.0f64.to_le_bytes());
    assert_eq!(&buf[40..48], &6.0f64.to_le_bytes());
    assert_eq!(DriftParticle::decode(&buf).unwrap(), p);
}

#[test]
fn decode_rejects_wrong_length() {
    let mut buf = Vec::new();
    DriftParticle::default().encode(&mut buf);
    assert!(DriftParticle::decode(&buf[..47]).is_err());
    buf.push(0);
    assert!(DriftParticle::decode(&buf).is_err());
}

#[test]
fn draw_uses_size_scaled_white() {
    let p = DriftParticle {
        x: 3.0,
        y: 4.0,
        size: 3.5,
        ..DriftParticle::default()
    };
    let mut s = RecordingSurface::new(960, 500);
    p.draw(&mut s);
    assert_eq!(
        s.ops,
        vec![
            DrawCall::SetColor(Rgba8::WHITE),
            DrawCall::Circle {
                x: 3.0,
                y: 4.0,
                radius: 3.5
            }
        ]
    );
}
