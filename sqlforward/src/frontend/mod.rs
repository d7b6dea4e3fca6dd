//! Connection front door.
//!
//! The driver shim calls [`Forward::connect`] once per connection and
//! [`Forward::prepare`] once per statement. The connect string decides
//! what happens to statements: translated for the backend, or recorded
//! and sent to the original database untouched.

use std::sync::Arc;

use sqlforward_config::RouteConfig;
use tracing::info;

use crate::config::config;
use crate::translator::{BindMap, Translator};
use crate::warehouse::Warehouse;

pub mod error;

pub use error::Error;

/// What happens to every statement on a connection.
#[derive(Debug, Clone)]
pub enum Interceptor {
    /// Replace statements using the mapping.
    Translate(Arc<Translator>),
    /// Record statements, don't change them.
    Record(Arc<Warehouse>),
}

/// Statement ready for the backend driver.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// Text sent to the backend.
    pub text: String,
    /// Positions of named markers in `text`. Only set when statements
    /// are translated; the original database binds by name itself.
    pub binds: Option<BindMap>,
}

/// A client connection.
#[derive(Debug, Clone)]
pub struct Forward {
    route: RouteConfig,
    interceptor: Interceptor,
}

impl Forward {
    /// Route a new connection, using the shared translator
    /// or warehouse for its mode.
    pub fn connect(url: &str) -> Result<Self, Error> {
        let config = config();
        let general = &config.config.general;
        let route = RouteConfig::parse_with(url, general)?;

        let interceptor = if route.mode.translates() {
            Interceptor::Translate(Translator::shared(&route.mapping, route.mapping_format)?)
        } else {
            Interceptor::Record(Warehouse::shared(
                &route.probe_file,
                general.warehouse_queue,
            )?)
        };

        info!(
            "connection routed to \"{}\" [mode: {}, backend: {}]",
            route.target, route.mode, route.backend
        );

        Ok(Self::new(route, interceptor))
    }

    /// Create a connection with explicit services.
    pub fn new(route: RouteConfig, interceptor: Interceptor) -> Self {
        Self { route, interceptor }
    }

    /// Connection route.
    pub fn route(&self) -> &RouteConfig {
        &self.route
    }

    /// Connect string for the backend driver.
    pub fn target(&self) -> &str {
        &self.route.target
    }

    /// Statement interceptor.
    pub fn interceptor(&self) -> &Interceptor {
        &self.interceptor
    }

    /// Prepare a statement for the backend.
    pub fn prepare(&self, statement: &str) -> Prepared {
        match &self.interceptor {
            Interceptor::Translate(translator) => {
                let binds = translator.translate_and_bind(statement);
                Prepared {
                    text: binds.translated().to_owned(),
                    binds: Some(binds),
                }
            }
            Interceptor::Record(warehouse) => Prepared {
                text: warehouse.record(statement).to_owned(),
                binds: None,
            },
        }
    }

    /// Statement executed directly, without parameters.
    pub fn statement<'a>(&'a self, statement: &'a str) -> &'a str {
        match &self.interceptor {
            Interceptor::Translate(translator) => translator.translate(statement),
            Interceptor::Record(warehouse) => warehouse.record(statement),
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use crate::translator::Store;

    use super::*;

    fn translator() -> Interceptor {
        Interceptor::Translate(Arc::new(Translator::new(
            [
                ("SELECT 1 FROM DUAL", "SELECT 1"),
                (
                    "SELECT ename FROM emp WHERE empno = :id",
                    "SELECT ename FROM emp WHERE empno = :id OR mgr = :id",
                ),
            ]
            .into_iter()
            .collect::<Store>(),
        )))
    }

    #[test]
    fn test_redirect() {
        let route = RouteConfig::parse(
            "jdbc:oracle:thin:@//db.local:1521/ORCL?forward.backend=mariadb&useSSL=true",
        )
        .unwrap();
        let forward = Forward::new(route, translator());

        assert_eq!(forward.target(), "jdbc:mariadb://db.local:1521/ORCL?useSSL=true");
        assert_eq!(forward.statement("SELECT 1 FROM DUAL"), "SELECT 1");

        let prepared = forward.prepare("SELECT ename FROM emp WHERE empno = :id");
        assert_eq!(
            prepared.text,
            "SELECT ename FROM emp WHERE empno = :id OR mgr = :id"
        );
        let binds = prepared.binds.unwrap();
        assert_eq!(binds.positions("id"), Some(&[1, 2][..]));
        assert_eq!(binds.original(), "SELECT ename FROM emp WHERE empno = :id");
    }

    #[test]
    fn test_discover_passes_through() {
        let route =
            RouteConfig::parse("jdbc:oracle:thin:@db.local:1521/ORCL?forward.mode=discover")
                .unwrap();
        let warehouse = Arc::new(Warehouse::with_sink(Box::new(std::io::sink()), 8).unwrap());
        let forward = Forward::new(route, Interceptor::Record(warehouse.clone()));

        assert_eq!(forward.target(), "jdbc:oracle:thin:@db.local:1521/ORCL");

        let prepared = forward.prepare("SELECT 1 FROM DUAL");
        assert_eq!(prepared.text, "SELECT 1 FROM DUAL");
        assert!(prepared.binds.is_none());
        assert_eq!(forward.statement("SELECT 1 FROM DUAL"), "SELECT 1 FROM DUAL");

        assert!(warehouse.shutdown(Duration::from_secs(5)));
        assert_eq!(warehouse.stats().seen, 1);
        assert_eq!(warehouse.stats().duplicates, 1);
    }

    #[test]
    fn test_connect_rejects_alias() {
        assert!(matches!(
            Forward::connect("jdbc:oracle:thin:@(DESCRIPTION=(ADDRESS=(HOST=db)))"),
            Err(Error::Config(sqlforward_config::Error::MalformedTarget { .. }))
        ));
        assert!(matches!(
            Forward::connect("jdbc:oracle:thin:@orcl_high?TNS_ADMIN=/wallet"),
            Err(Error::Config(sqlforward_config::Error::MalformedTarget { .. }))
        ));
    }
}
