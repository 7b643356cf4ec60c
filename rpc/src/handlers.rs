//! Request handlers and their wire types.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use docguard_access::{Ack, ReadAuthorization};
use docguard_crypto::fingerprint;
use docguard_geofence::LocationFix;
use docguard_node::{NodeStatus, SignedAccessChange, SignedSuppression};
use docguard_provenance::{BindOutcome, BindRequest};
use docguard_types::{
    ContentRef, Fingerprint, GeoPoint, LocationConstraint, ProvenanceRecord, Signature,
    SubmitterAddress, Timestamp,
};
use docguard_verification::VerdictEnvelope;

use crate::pagination::{PaginationMeta, PaginationParams};
use crate::{ApiResponse, RpcError, RpcState};

type ApiResult<T> = Result<Json<ApiResponse<T>>, RpcError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

fn parse_fingerprint(raw: &str) -> Result<Fingerprint, RpcError> {
    Ok(Fingerprint::from_hex(raw)?)
}

/// Who is reading. All three fields come together or not at all; the
/// signature is over [`ReadAuthorization::message`] for the fingerprint being
/// read, or the listing scope for `/audit`.
#[derive(Debug, Default, Deserialize)]
pub struct ReaderParams {
    pub requester: Option<String>,
    /// Unix seconds the signature was made at.
    pub issued_at: Option<u64>,
    pub signature: Option<String>,
}

impl ReaderParams {
    fn authorization(&self) -> Result<Option<ReadAuthorization>, RpcError> {
        let requester = self.requester.as_deref().filter(|s| !s.is_empty());
        match (requester, self.issued_at, self.signature.as_deref()) {
            (None, None, None) => Ok(None),
            (Some(requester), Some(issued_at), Some(signature)) => Ok(Some(ReadAuthorization {
                requester: SubmitterAddress::parse(requester)?,
                issued_at: Timestamp::new(issued_at),
                signature: Signature::from_hex(signature)?,
            })),
            (Some(_), _, _) => Err(RpcError::Forbidden(
                "an unsigned requester is not accepted; send issued_at and signature".into(),
            )),
            (None, _, _) => Err(RpcError::InvalidRequest(
                "issued_at and signature need a requester".into(),
            )),
        }
    }
}

/// Fingerprint off the async executor; documents can be large.
async fn fingerprint_blocking(body: Bytes) -> Result<Fingerprint, RpcError> {
    tokio::task::spawn_blocking(move || fingerprint(&body))
        .await
        .map_err(|e| RpcError::Server(e.to_string()))
}

// ── Submission ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SubmitParams {
    pub submitter: String,
    /// Hex signature over the fingerprint's signing message.
    pub signature: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    /// Set when the bytes already live in an external content store.
    pub content_ref: Option<String>,
}

impl SubmitParams {
    fn location(&self) -> Result<Option<LocationConstraint>, RpcError> {
        match (self.lat, self.lon, self.radius) {
            (None, None, None) => Ok(None),
            (Some(lat), Some(lon), Some(radius)) => {
                Ok(Some(LocationConstraint::new(GeoPoint::new(lat, lon)?, radius)?))
            }
            _ => Err(RpcError::InvalidRequest(
                "lat, lon and radius must be given together".into(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// `"bound"` for a new record, `"conflict"` when one already existed.
    pub outcome: String,
    /// The conflicting record was created by the same submitter.
    pub own_prior_submission: bool,
    pub record: ProvenanceRecord,
}

/// `POST /records`: body is the document.
pub async fn submit(
    State(state): State<RpcState>,
    Query(params): Query<SubmitParams>,
    body: Bytes,
) -> ApiResult<SubmitResponse> {
    let submitter = SubmitterAddress::parse(params.submitter.as_str())?;
    let signature = Signature::from_hex(&params.signature)?;
    let location = params.location()?;
    let content_ref = params
        .content_ref
        .as_deref()
        .map(|r| ContentRef::new(r))
        .transpose()?;

    let node = state.node.clone();
    let claimant = submitter.clone();
    let outcome = tokio::task::spawn_blocking(move || match content_ref {
        Some(content_ref) => node.bind(BindRequest {
            fingerprint: fingerprint(&body),
            signature,
            submitter: claimant,
            content_ref,
            location,
        }),
        None => node.submit(&body, claimant, signature, location),
    })
    .await
    .map_err(|e| RpcError::Server(e.to_string()))??;

    ok(SubmitResponse {
        outcome: if outcome.is_bound() { "bound" } else { "conflict" }.to_string(),
        own_prior_submission: outcome.is_own_prior_submission(&submitter),
        record: match outcome {
            BindOutcome::Bound(record) => record,
            BindOutcome::Conflict { existing } => existing,
        },
    })
}

// ── Verification ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct VerifyParams {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub accuracy: Option<f64>,
    /// Why the client has no position: `denied`, `unavailable` or `timed_out`.
    pub location_error: Option<String>,
}

impl VerifyParams {
    fn fix(&self) -> Result<Option<LocationFix>, RpcError> {
        match (self.lat, self.lon, self.location_error.as_deref()) {
            (Some(lat), Some(lon), None) => Ok(Some(LocationFix::Position {
                point: GeoPoint::new(lat, lon)?,
                accuracy_m: self.accuracy,
            })),
            (None, None, None) => Ok(None),
            (None, None, Some("denied")) => Ok(Some(LocationFix::Denied)),
            (None, None, Some("unavailable")) => Ok(Some(LocationFix::Unavailable)),
            (None, None, Some("timed_out")) => Ok(Some(LocationFix::TimedOut)),
            (None, None, Some(other)) => Err(RpcError::InvalidRequest(format!(
                "unknown location_error '{other}'"
            ))),
            _ => Err(RpcError::InvalidRequest(
                "give either lat and lon, or location_error".into(),
            )),
        }
    }
}

/// `POST /verify`: body is the candidate document.
pub async fn verify(
    State(state): State<RpcState>,
    Query(params): Query<VerifyParams>,
    Query(reader): Query<ReaderParams>,
    body: Bytes,
) -> ApiResult<VerdictEnvelope> {
    let reader = reader.authorization()?;
    let fix = params.fix()?;
    let fp = fingerprint_blocking(body).await?;
    let verdict = state.node.verify_fingerprint(fp, reader.as_ref(), fix)?;
    ok(verdict.to_envelope())
}

// ── Records and audit ────────────────────────────────────────────────────

/// `GET /records/:fingerprint`
pub async fn get_record(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
    Query(reader): Query<ReaderParams>,
) -> ApiResult<ProvenanceRecord> {
    let fp = parse_fingerprint(&raw)?;
    let reader = reader.authorization()?;
    match state.node.record(&fp, reader.as_ref())? {
        Some(record) => ok(record),
        None => Err(RpcError::NotFound(format!("no record for fingerprint {fp}"))),
    }
}

/// `GET /records/:fingerprint/content`: the stored bytes, if this node holds them.
pub async fn get_content(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
    Query(reader): Query<ReaderParams>,
) -> Result<Response, RpcError> {
    let fp = parse_fingerprint(&raw)?;
    let reader = reader.authorization()?;
    let record = state
        .node
        .record(&fp, reader.as_ref())?
        .ok_or_else(|| RpcError::NotFound(format!("no record for fingerprint {fp}")))?;
    let bytes = state
        .node
        .content(&record.content_ref)?
        .ok_or_else(|| {
            RpcError::NotFound(format!("content {} not held here", record.content_ref.as_str()))
        })?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditResponse {
    pub records: Vec<ProvenanceRecord>,
    #[serde(flatten)]
    pub pagination: PaginationMeta,
}

/// `GET /audit?cursor=&count=`: under a restrictive policy only the records
/// the signed reader may see.
pub async fn audit(
    State(state): State<RpcState>,
    Query(params): Query<PaginationParams>,
    Query(reader): Query<ReaderParams>,
) -> ApiResult<AuditResponse> {
    let offset = params
        .decode_offset()
        .ok_or_else(|| RpcError::InvalidRequest("malformed cursor".into()))?;
    let reader = reader.authorization()?;
    let page = state.node.audit_page(
        offset,
        params.effective_count() as usize,
        reader.as_ref(),
    )?;
    ok(AuditResponse {
        records: page.records,
        pagination: PaginationMeta::from_next_offset(page.next_offset),
    })
}

// ── Access control ───────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub ack: Ack,
}

/// `POST /access/grant`
pub async fn grant(
    State(state): State<RpcState>,
    Json(change): Json<SignedAccessChange>,
) -> ApiResult<AckResponse> {
    ok(AckResponse {
        ack: state.node.grant(&change)?,
    })
}

/// `POST /access/revoke`
pub async fn revoke(
    State(state): State<RpcState>,
    Json(change): Json<SignedAccessChange>,
) -> ApiResult<AckResponse> {
    ok(AckResponse {
        ack: state.node.revoke(&change)?,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AllowedResponse {
    pub allowed: bool,
}

/// `GET /access/:fingerprint/:address`
pub async fn check_access(
    State(state): State<RpcState>,
    Path((raw_fp, raw_address)): Path<(String, String)>,
    Query(reader): Query<ReaderParams>,
) -> ApiResult<AllowedResponse> {
    let fp = parse_fingerprint(&raw_fp)?;
    let who = SubmitterAddress::parse(raw_address)?;
    let reader = reader.authorization()?;
    ok(AllowedResponse {
        allowed: state.node.can_access(&fp, &who, reader.as_ref())?,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GranteesResponse {
    pub grantees: Vec<SubmitterAddress>,
}

/// `GET /access/:fingerprint`
pub async fn grantees(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
    Query(reader): Query<ReaderParams>,
) -> ApiResult<GranteesResponse> {
    let fp = parse_fingerprint(&raw)?;
    let reader = reader.authorization()?;
    ok(GranteesResponse {
        grantees: state.node.grantees(&fp, reader.as_ref())?,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: u64,
}

/// `GET /records/:fingerprint/nonce`: the nonce to sign the next grant,
/// revoke, hide or unhide over.
pub async fn nonce(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
) -> ApiResult<NonceResponse> {
    let fp = parse_fingerprint(&raw)?;
    ok(NonceResponse {
        nonce: state.node.authorization_nonce(&fp)?,
    })
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
    pub by: SubmitterAddress,
    pub nonce: u64,
    pub signature: Signature,
}

/// `POST /records/:fingerprint/hide`
pub async fn hide(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> ApiResult<AckResponse> {
    let request = SignedSuppression {
        fingerprint: parse_fingerprint(&raw)?,
        by: req.by,
        nonce: req.nonce,
        signature: req.signature,
    };
    ok(AckResponse {
        ack: state.node.hide(&request)?,
    })
}

/// `POST /records/:fingerprint/unhide`
pub async fn unhide(
    State(state): State<RpcState>,
    Path(raw): Path<String>,
    Json(req): Json<VisibilityRequest>,
) -> ApiResult<AckResponse> {
    let request = SignedSuppression {
        fingerprint: parse_fingerprint(&raw)?,
        by: req.by,
        nonce: req.nonce,
        signature: req.signature,
    };
    ok(AckResponse {
        ack: state.node.unhide(&request)?,
    })
}

// ── Node ─────────────────────────────────────────────────────────────────

/// `GET /status`
pub async fn status(State(state): State<RpcState>) -> ApiResult<NodeStatus> {
    ok(state.node.status()?)
}

/// `GET /metrics`: Prometheus text format, when enabled.
pub async fn metrics(State(state): State<RpcState>) -> Result<Response, RpcError> {
    if !state.node.config().enable_metrics {
        return Err(RpcError::NotFound("metrics are disabled".into()));
    }
    let text = state
        .node
        .metrics()
        .encode()
        .map_err(|e| RpcError::Server(e.to_string()))?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        text,
    )
        .into_response())
}
