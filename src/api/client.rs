//! REST client for the HR backend

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::{
    AttendanceRecord, DocumentTemplate, Employee, NamedRef, SalaryStructure, TemplateVariable,
    UserProfile,
};
use crate::session::{LogoutReason, Session, SessionManager};

use super::error::{status_error, ApiError};

/// List endpoints answer either with a bare array or with a page
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Page { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Page { results } => results,
            ListResponse::Plain(items) => items,
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "access", alias = "key")]
    token: String,
    #[serde(default)]
    user: Option<UserProfile>,
}

/// Client bound to one backend and one session
///
/// Requests carry the session's bearer token. A 401 on any request clears
/// the session, which broadcasts a forced logout. Requests are not retried.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        session: Arc<SessionManager>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match self.session.bearer() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = status_error(status, &text);
            if status == StatusCode::UNAUTHORIZED {
                if let Err(e) = self.session.clear(LogoutReason::Unauthorized) {
                    tracing::error!(error = %e, "failed to clear stored session");
                }
            } else {
                tracing::debug!(status = status.as_u16(), error = %err, "backend returned error");
            }
            return Err(err);
        }

        Ok(serde_json::from_str(&text)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let req = self.authorized(self.http.get(self.url(path)));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let list: ListResponse<T> = self.get(path).await?;
        Ok(list.into_vec())
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let req = self.authorized(self.http.post(self.url(path)).json(body));
        let response = req.send().await?;
        self.handle_response(response).await
    }

    /// Exchange credentials for a token and store the new session
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, ApiError> {
        let response: LoginResponse = self
            .post("auth/login/", &LoginRequest { username, password })
            .await?;

        let session = Session {
            token: response.token,
            user: response.user,
        };
        self.session.set(session.clone())?;
        tracing::info!(user = username, "logged in");
        Ok(session)
    }

    /// Forget the local session
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.clear(LogoutReason::UserInitiated)?;
        Ok(())
    }

    pub async fn employees(&self) -> Result<Vec<Employee>, ApiError> {
        self.get_list("employees/").await
    }

    pub async fn employee(&self, id: u64) -> Result<Employee, ApiError> {
        self.get(&format!("employees/{}/", id)).await
    }

    pub async fn departments(&self) -> Result<Vec<NamedRef>, ApiError> {
        self.get_list("departments/").await
    }

    pub async fn designations(&self) -> Result<Vec<NamedRef>, ApiError> {
        self.get_list("designations/").await
    }

    pub async fn shifts(&self) -> Result<Vec<NamedRef>, ApiError> {
        self.get_list("shifts/").await
    }

    pub async fn attendance(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.get_list(&format!("attendance/?date={}", date.format("%Y-%m-%d")))
            .await
    }

    pub async fn salary_structures(&self, employee_id: u64) -> Result<Vec<SalaryStructure>, ApiError> {
        self.get_list(&format!("salary-structures/?employee={}", employee_id))
            .await
    }

    pub async fn templates(&self) -> Result<Vec<DocumentTemplate>, ApiError> {
        self.get_list("document-templates/").await
    }

    pub async fn template(&self, id: u64) -> Result<DocumentTemplate, ApiError> {
        self.get(&format!("document-templates/{}/", id)).await
    }

    pub async fn template_variables(&self) -> Result<Vec<TemplateVariable>, ApiError> {
        self.get_list("template-variables/").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let session = Arc::new(SessionManager::restore(MemoryStore::new()));
        ApiClient::new(base, session, None).expect("Should build client")
    }

    #[test]
    fn test_url_joining() {
        let c = client("http://localhost:8000/api/");
        assert_eq!(c.base_url(), "http://localhost:8000/api");
        assert_eq!(c.url("/employees/"), "http://localhost:8000/api/employees/");
        assert_eq!(c.url("employees/3/"), "http://localhost:8000/api/employees/3/");
    }

    #[test]
    fn test_list_response_shapes() {
        let plain: ListResponse<NamedRef> =
            serde_json::from_str(r#"[{"id": 1, "name": "Finance"}]"#).unwrap();
        assert_eq!(plain.into_vec().len(), 1);

        let page: ListResponse<NamedRef> = serde_json::from_str(
            r#"{"count": 2, "next": null, "results": [{"id": 1, "name": "A"}, {"id": 2, "name": "B"}]}"#,
        )
        .unwrap();
        assert_eq!(page.into_vec()[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_login_response_token_aliases() {
        let r: LoginResponse = serde_json::from_str(r#"{"access": "jwt"}"#).unwrap();
        assert_eq!(r.token, "jwt");
        assert!(r.user.is_none());

        let r: LoginResponse =
            serde_json::from_str(r#"{"token": "t", "user": {"username": "hr"}}"#).unwrap();
        assert_eq!(r.user.and_then(|u| u.username).as_deref(), Some("hr"));
    }

    #[test]
    fn test_logout_broadcasts() {
        let c = client("http://localhost");
        c.session().set(Session::new("t")).unwrap();
        let mut rx = c.session().subscribe();
        c.logout().unwrap();
        assert_eq!(rx.try_recv().unwrap().reason, LogoutReason::UserInitiated);
        assert!(!c.session().is_authenticated());
    }
}
