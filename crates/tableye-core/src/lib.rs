//! # Tableye Core
//!
//! 카지노 운영 추적 API의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 HTTP 계층에 의존하지 않는 기본 타입을 제공합니다:
//! - 사용자 및 역할 타입
//! - 딜러/카지노 요약 정보
//! - 식별 저장소 계약 ([`UserStore`]) 및 인메모리 구현
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod store;

pub use crate::config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use store::{InMemoryUserStore, StoreError, StoreResult, UserStore};
