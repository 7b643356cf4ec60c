use docguard_types::{
    ContentRef, Fingerprint, GeoPoint, LocationConstraint, Signature, SubmitterAddress,
};

use crate::InputError;

/// A submitter's signed claim over a fingerprint, ready to bind.
#[derive(Clone, Debug, PartialEq)]
pub struct BindRequest {
    pub fingerprint: Fingerprint,
    pub signature: Signature,
    pub submitter: SubmitterAddress,
    pub content_ref: ContentRef,
    pub location: Option<LocationConstraint>,
}

impl BindRequest {
    /// Build a request from transport strings.
    ///
    /// `location` is `(lat, lon, radius_meters)`.
    pub fn parse(
        fingerprint: &str,
        signature: &str,
        submitter: &str,
        content_ref: &str,
        location: Option<(f64, f64, f64)>,
    ) -> Result<Self, InputError> {
        let location = location
            .map(|(lat, lon, radius)| LocationConstraint::new(GeoPoint::new(lat, lon)?, radius))
            .transpose()?;
        Ok(Self {
            fingerprint: fingerprint.parse()?,
            signature: signature.parse()?,
            submitter: submitter.parse()?,
            content_ref: ContentRef::new(content_ref)?,
            location,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docguard_types::TypesError;

    const FP: &str = "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8";

    fn addr() -> String {
        docguard_crypto::derive_address(&docguard_types::PublicKey([4; 32])).to_string()
    }

    #[test]
    fn parses_well_formed_input() {
        let sig = "ab".repeat(64);
        let req = BindRequest::parse(FP, &sig, &addr(), "bafy123", Some((10.0, 10.0, 100.0)))
            .unwrap();
        assert_eq!(req.fingerprint.to_hex(), FP);
        assert_eq!(req.location.unwrap().radius_meters(), 100.0);
    }

    #[test]
    fn rejects_bad_pieces() {
        let sig = "ab".repeat(64);
        assert!(BindRequest::parse("xyz", &sig, &addr(), "r", None).is_err());
        assert!(BindRequest::parse(FP, "00", &addr(), "r", None).is_err());
        assert!(BindRequest::parse(FP, &sig, "dgv_nope", "r", None).is_err());
        assert_eq!(
            BindRequest::parse(FP, &sig, &addr(), "  ", None),
            Err(InputError::Malformed(TypesError::EmptyContentRef))
        );
        assert_eq!(
            BindRequest::parse(FP, &sig, &addr(), "r", Some((10.0, 10.0, 0.0))),
            Err(InputError::Malformed(TypesError::InvalidRadius(0.0)))
        );
        assert!(matches!(
            BindRequest::parse(FP, &sig, &addr(), "r", Some((95.0, 10.0, 5.0))),
            Err(InputError::Malformed(TypesError::InvalidCoordinate { .. }))
        ));
    }
}
