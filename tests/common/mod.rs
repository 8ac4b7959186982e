use car_workshop::api;
use constcat::concat;
use reqwest::StatusCode;
use serde_json::json;

const BASE_URL: &str = "http://localhost:3000";

/// Generates a login nobody else holds, so tests can run in parallel
/// against a shared database.
pub fn unique_login(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4())
}

/// Registers a fresh worker under a unique login and authenticates it.
pub async fn worker_client(name: &str) -> Client {
    let login = unique_login(name);
    let client = Client::new();
    client
        .register(name, &login, "password")
        .await
        .expect("failed to register a worker");
    client.auth(&login, "password").await
}

pub struct Client {
    inner: reqwest::Client,
    pub auth_token: Option<String>,
}

impl Client {
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
            auth_token: None,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        login: &str,
        password: &str,
    ) -> Result<api::Worker, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/register");

        Ok(self
            .inner
            .post(URL)
            .json(&json!({
                "name": name,
                "login": login,
                "password": password,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Worker>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn auth(mut self, login: &str, password: &str) -> Self {
        const URL: &str = concat!(BASE_URL, "/auth");

        self.auth_token = Some(
            self.inner
                .post(URL)
                .json(&json!({
                    "login": login,
                    "password": password,
                }))
                .send()
                .await
                .expect("failed to send a request")
                .error_for_status()
                .expect("wrong status code")
                .text()
                .await
                .expect("failed to get a response"),
        );

        self
    }

    pub async fn try_auth(
        &self,
        login: &str,
        password: &str,
    ) -> Result<String, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/auth");

        Ok(self
            .inner
            .post(URL)
            .json(&json!({
                "login": login,
                "password": password,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .text()
            .await
            .expect("failed to get a response"))
    }

    pub async fn worker(&self) -> Result<api::worker::Profile, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/worker");

        let mut req = self.inner.get(URL);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::worker::Profile>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn worker_tickets(
        &self,
    ) -> Result<Vec<api::ticket::Summary>, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/worker/ticket");

        let mut req = self.inner.get(URL);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<Vec<api::ticket::Summary>>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn get_tickets(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<api::ticket::List, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self
            .inner
            .get(format!("{URL}?offset={offset}&limit={limit}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::ticket::List>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn add_ticket(
        &self,
        brand: &str,
        model: &str,
        registration_id: &str,
        description: &str,
    ) -> Result<api::Ticket, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.post(URL);
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .json(&json!({
                "brand": brand,
                "model": model,
                "registrationId": registration_id,
                "description": description,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn get_ticket(
        &self,
        id: api::ticket::Id,
    ) -> Result<api::Ticket, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.get(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn edit_ticket(
        &self,
        id: api::ticket::Id,
        brand: &str,
        model: &str,
        registration_id: &str,
        description: &str,
        status: api::ticket::Status,
    ) -> Result<api::Ticket, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.patch(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .json(&json!({
                "brand": brand,
                "model": model,
                "registrationId": registration_id,
                "description": description,
                "status": status,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Ticket>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn delete_ticket(
        &self,
        id: api::ticket::Id,
    ) -> Result<(), StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.delete(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req.send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?;
        Ok(())
    }

    pub async fn add_part(
        &self,
        ticket_id: api::ticket::Id,
        name: &str,
        price: f64,
        quantity: f64,
    ) -> Result<api::Part, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.post(format!("{URL}/{ticket_id}/part"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .json(&json!({
                "name": name,
                "price": price,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Part>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn update_part(
        &self,
        id: api::part::Id,
        name: &str,
        price: f64,
        quantity: f64,
    ) -> Result<api::Part, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/part");

        let mut req = self.inner.put(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .json(&json!({
                "name": name,
                "price": price,
                "quantity": quantity,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::Part>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn delete_part(
        &self,
        id: api::part::Id,
    ) -> Result<(), StatusCode> {
        const URL: &str = concat!(BASE_URL, "/part");

        let mut req = self.inner.delete(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req.send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?;
        Ok(())
    }

    pub async fn add_time_slot(
        &self,
        ticket_id: api::ticket::Id,
        start_time: &str,
        end_time: &str,
    ) -> Result<api::TimeSlot, StatusCode> {
        const URL: &str = concat!(BASE_URL, "/ticket");

        let mut req = self.inner.post(format!("{URL}/{ticket_id}/time-slot"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        Ok(req
            .json(&json!({
                "startTime": start_time,
                "endTime": end_time,
            }))
            .send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?
            .json::<api::TimeSlot>()
            .await
            .expect("failed to get a response"))
    }

    pub async fn delete_time_slot(
        &self,
        id: api::time_slot::Id,
    ) -> Result<(), StatusCode> {
        const URL: &str = concat!(BASE_URL, "/time-slot");

        let mut req = self.inner.delete(format!("{URL}/{id}"));
        if let Some(token) = &self.auth_token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        req.send()
            .await
            .expect("failed to send a request")
            .error_for_status()
            .map_err(|e| e.status().expect("status error"))?;
        Ok(())
    }
}
