//! End-to-end gate and adder tests
//!
//! Encrypt → gates → decrypt must match the plain Boolean result, with
//! bootstrapping keeping long circuits alive.

use std::sync::OnceLock;

use rlwe_bool::{FheEngine, FheError, FheParams};

/// Toy engine with bootstrapping, built once per test binary
fn engine() -> &'static FheEngine {
    static ENGINE: OnceLock<FheEngine> = OnceLock::new();
    ENGINE.get_or_init(|| FheEngine::new(FheParams::toy().with_seed(2024)).unwrap())
}

#[test]
fn test_bit_roundtrip() {
    let engine = engine();
    for _ in 0..4 {
        for bit in [0u8, 1] {
            let ct = engine.encrypt_bit(bit).unwrap();
            assert_eq!(engine.decrypt_bit(&ct).unwrap(), bit);
        }
    }
    let bits = [1u8, 0, 0, 1, 1];
    let cts = engine.encrypt_bits(&bits).unwrap();
    assert_eq!(engine.decrypt_bits(&cts).unwrap(), bits);
}

#[test]
fn test_gate_truth_tables() {
    let engine = engine();
    for x in 0..2u8 {
        for y in 0..2u8 {
            let a = engine.encrypt_bit(x).unwrap();
            let b = engine.encrypt_bit(y).unwrap();

            let and = engine.and(&a, &b).unwrap();
            let or = engine.or(&a, &b).unwrap();
            let nand = engine.nand(&a, &b).unwrap();
            let nor = engine.nor(&a, &b).unwrap();
            let xor = engine.xor(&a, &b).unwrap();

            assert_eq!(engine.decrypt_bit(&and).unwrap(), x & y, "AND({}, {})", x, y);
            assert_eq!(engine.decrypt_bit(&or).unwrap(), x | y, "OR({}, {})", x, y);
            assert_eq!(engine.decrypt_bit(&nand).unwrap(), 1 - (x & y), "NAND({}, {})", x, y);
            assert_eq!(engine.decrypt_bit(&nor).unwrap(), 1 - (x | y), "NOR({}, {})", x, y);
            assert_eq!(engine.decrypt_bit(&xor).unwrap(), x ^ y, "XOR({}, {})", x, y);
        }
        let a = engine.encrypt_bit(x).unwrap();
        assert_eq!(engine.decrypt_bit(&engine.not(&a).unwrap()).unwrap(), 1 - x);
    }
}

#[test]
fn test_deep_chain_survives_through_refresh() {
    // 4 levels of top, 2 per XOR: the third XOR has to refresh
    let engine = engine();
    let mut acc = engine.encrypt_bit(1).unwrap();
    let mut expected = 1u8;
    for (i, bit) in [1u8, 0, 1, 1, 0].into_iter().enumerate() {
        let ct = engine.encrypt_bit(bit).unwrap();
        acc = engine.xor(&acc, &ct).unwrap();
        expected ^= bit;
        assert_eq!(engine.decrypt_bit(&acc).unwrap(), expected, "step {}", i);
    }
}

#[test]
fn test_variadic_gates() {
    let engine = engine();
    let bits = [1u8, 1, 1, 0, 1];
    let cts = engine.encrypt_bits(&bits).unwrap();

    assert_eq!(engine.decrypt_bit(&engine.and_many(&cts).unwrap()).unwrap(), 0);
    assert_eq!(engine.decrypt_bit(&engine.and_many(&cts[..3]).unwrap()).unwrap(), 1);
    assert_eq!(engine.decrypt_bit(&engine.or_many(&cts).unwrap()).unwrap(), 1);
    assert_eq!(engine.decrypt_bit(&engine.xor_many(&cts).unwrap()).unwrap(), 0);
    assert_eq!(engine.decrypt_bit(&engine.xor_many(&cts[1..]).unwrap()).unwrap(), 1);
}

fn add_plain(a: u64, b: u64) -> u64 {
    let engine = engine();
    let ca = engine.encrypt_integer(a, 8).unwrap();
    let cb = engine.encrypt_integer(b, 8).unwrap();
    let sum = engine.add(&ca, &cb).unwrap();
    assert_eq!(sum.len(), 8);
    engine.decrypt_integer(&sum).unwrap()
}

#[test]
fn test_adder_small() {
    assert_eq!(add_plain(3, 5), 8);
}

#[test]
fn test_adder_wraparound() {
    assert_eq!(add_plain(255, 1), 0);
}

#[test]
fn test_adder_high_bits() {
    assert_eq!(add_plain(128, 128), 0);
}

#[test]
fn test_foreign_ciphertext_rejected() {
    let other = FheEngine::new(FheParams::new(16, 17, 3, false).with_seed(1)).unwrap();
    let a = engine().encrypt_bit(1).unwrap();
    let b = other.encrypt_bit(1).unwrap();
    assert!(matches!(engine().and(&a, &b), Err(FheError::ModulusMismatch(_))));
    assert!(matches!(a.add(&b), Err(FheError::ModulusMismatch(_))));
}
