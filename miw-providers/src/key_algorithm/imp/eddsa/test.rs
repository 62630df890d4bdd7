use super::*;

#[test]
fn test_jwk_to_bytes() {
    let jwk = PublicKeyJwk::Okp(PublicKeyJwkEllipticData {
        r#use: None,
        crv: "Ed25519".to_owned(),
        x: "m7AE5UQdjLuCOnZHB1gCFfo2uvhM6W_4xFmpJK02r7s".to_owned(),
        y: None,
    });

    assert_eq!(
        vec![
            155, 176, 4, 229, 68, 29, 140, 187, 130, 58, 118, 71, 7, 88, 2, 21, 250, 54, 186, 248,
            76, 233, 111, 248, 196, 89, 169, 36, 173, 54, 175, 187,
        ],
        Eddsa.jwk_to_bytes(&jwk).unwrap()
    )
}

#[test]
fn test_jwk_round_trip_of_generated_key() {
    let key = Eddsa.generate_key_pair();

    let jwk = Eddsa.bytes_to_jwk(&key.public).unwrap();
    assert_eq!(key.public, Eddsa.jwk_to_bytes(&jwk).unwrap());
}

#[test]
fn test_rejects_ec_jwk() {
    let jwk = PublicKeyJwk::Ec(PublicKeyJwkEllipticData {
        r#use: None,
        crv: "P-256".to_owned(),
        x: "CQKO9r8IF7mEYhZImiOoLqw70WYLAohqT3JkomZW3x4".to_owned(),
        y: Some("khCene-e-_GAeE8N-aWUUucY_dVGRGCqpQmVhPwDHUM".to_owned()),
    });

    assert!(Eddsa.jwk_to_bytes(&jwk).is_err());
}

#[test]
fn test_rejects_truncated_key() {
    assert!(Eddsa.bytes_to_jwk(&[7; 31]).is_err());
}
