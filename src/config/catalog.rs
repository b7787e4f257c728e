//! Parameter descriptors: key, type and default for every server setting
//!
//! Each parameter is a [`Param`] constant, listed in [`CATALOG`] and exposed
//! as a named accessor on [`ConfigurationStore`]. All of them resolve through
//! [`ConfigurationStore::get`].

use crate::config::error::Result;
use crate::config::store::ConfigurationStore;
use crate::domain::{ConfigEnum, ETagSupport, Encoding, FhirVersion};
use std::collections::BTreeSet;
use std::marker::PhantomData;

/// A type a parameter can resolve to.
pub trait ParamValue: Sized {
    /// How the declared default is written in the catalog.
    type Default: Copy + Send + Sync + 'static;

    const TYPE_NAME: &'static str;

    fn resolve(store: &ConfigurationStore, key: &str, default: Self::Default) -> Result<Self>;

    fn render(&self) -> String;

    fn render_default(default: Self::Default) -> String;
}

impl ParamValue for String {
    type Default = &'static str;
    const TYPE_NAME: &'static str = "string";

    fn resolve(store: &ConfigurationStore, key: &str, default: &'static str) -> Result<Self> {
        store.get_string_or(key, default)
    }

    fn render(&self) -> String {
        self.clone()
    }

    fn render_default(default: &'static str) -> String {
        default.to_string()
    }
}

/// Strings with no default; blank counts as unset.
impl ParamValue for Option<String> {
    type Default = ();
    const TYPE_NAME: &'static str = "optional string";

    fn resolve(store: &ConfigurationStore, key: &str, _: ()) -> Result<Self> {
        Ok(store.get_string(key)?.filter(|value| !value.trim().is_empty()))
    }

    fn render(&self) -> String {
        self.clone().unwrap_or_default()
    }

    fn render_default(_: ()) -> String {
        String::new()
    }
}

impl ParamValue for bool {
    type Default = bool;
    const TYPE_NAME: &'static str = "boolean";

    fn resolve(store: &ConfigurationStore, key: &str, default: bool) -> Result<Self> {
        store.get_bool(key, default)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn render_default(default: bool) -> String {
        default.to_string()
    }
}

impl ParamValue for i32 {
    type Default = i32;
    const TYPE_NAME: &'static str = "integer";

    fn resolve(store: &ConfigurationStore, key: &str, default: i32) -> Result<Self> {
        store.get_int(key, default)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn render_default(default: i32) -> String {
        default.to_string()
    }
}

impl ParamValue for i64 {
    type Default = &'static str;
    const TYPE_NAME: &'static str = "long";

    fn resolve(store: &ConfigurationStore, key: &str, default: &'static str) -> Result<Self> {
        store.get_long(key, default)
    }

    fn render(&self) -> String {
        self.to_string()
    }

    fn render_default(default: &'static str) -> String {
        default.to_string()
    }
}

impl ParamValue for BTreeSet<String> {
    type Default = ();
    const TYPE_NAME: &'static str = "string set";

    fn resolve(store: &ConfigurationStore, key: &str, _: ()) -> Result<Self> {
        store.get_string_set(key)
    }

    fn render(&self) -> String {
        self.iter().map(String::as_str).collect::<Vec<_>>().join(",")
    }

    fn render_default(_: ()) -> String {
        String::new()
    }
}

macro_rules! enum_params {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ParamValue for $ty {
                type Default = $ty;
                const TYPE_NAME: &'static str = <$ty as ConfigEnum>::TYPE_NAME;

                fn resolve(store: &ConfigurationStore, key: &str, default: $ty) -> Result<Self> {
                    store.get_enum(key, default)
                }

                fn render(&self) -> String {
                    self.name().to_string()
                }

                fn render_default(default: $ty) -> String {
                    default.name().to_string()
                }
            }
        )+
    };
}

enum_params!(FhirVersion, Encoding, ETagSupport);

/// A `(key, type, default)` triple.
pub struct Param<T: ParamValue> {
    key: &'static str,
    default: T::Default,
    _type: PhantomData<fn() -> T>,
}

impl<T: ParamValue> Param<T> {
    pub const fn new(key: &'static str, default: T::Default) -> Self {
        Self { key, default, _type: PhantomData }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> T::Default {
        self.default
    }
}

/// Type-erased view of a [`Param`], for listing and display.
pub trait Descriptor: Sync {
    fn key(&self) -> &'static str;

    fn type_name(&self) -> &'static str;

    fn default_display(&self) -> String;

    /// Resolve against `store` and render the result as text.
    fn resolve_display(&self, store: &ConfigurationStore) -> Result<String>;
}

impl<T: ParamValue> Descriptor for Param<T> {
    fn key(&self) -> &'static str {
        self.key
    }

    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn default_display(&self) -> String {
        T::render_default(self.default)
    }

    fn resolve_display(&self, store: &ConfigurationStore) -> Result<String> {
        Ok(store.get(self)?.render())
    }
}

/// Look up a catalog entry by key.
pub fn find(key: &str) -> Option<&'static dyn Descriptor> {
    CATALOG.iter().copied().find(|descriptor| descriptor.key() == key)
}

macro_rules! catalog {
    (
        $(
            $(#[$meta:meta])*
            $accessor:ident => $konst:ident: $ty:ty = ($key:literal, $default:expr);
        )+
    ) => {
        $(
            $(#[$meta])*
            pub const $konst: Param<$ty> = Param::new($key, $default);
        )+

        /// Every known parameter, in declaration order.
        pub static CATALOG: &[&dyn Descriptor] = &[$(&$konst),+];

        impl ConfigurationStore {
            $(
                $(#[$meta])*
                pub fn $accessor(&self) -> Result<$ty> {
                    self.get(&$konst)
                }
            )+
        }
    };
}

catalog! {
    fhir_version => FHIR_VERSION: FhirVersion = ("fhir_version", FhirVersion::Dstu3);
    default_encoding => DEFAULT_ENCODING: Encoding = ("default_encoding", Encoding::Json);
    etag_support => ETAG_SUPPORT: ETagSupport = ("etag_support", ETagSupport::Enabled);
    default_pretty_print => DEFAULT_PRETTY_PRINT: bool = ("default_pretty_print", true);

    /// Address the server reports as its own base URL.
    server_address => SERVER_ADDRESS: Option<String> = ("server_address", ());
    server_id => SERVER_ID: String = ("server.id", "home");
    server_name => SERVER_NAME: String = ("server.name", "Local Tester");

    default_page_size => DEFAULT_PAGE_SIZE: i32 = ("default_page_size", 20);
    maximum_page_size => MAX_PAGE_SIZE: i32 = ("max_page_size", 200);
    maximum_fetch_size => MAX_FETCH_SIZE: i32 = ("max_fetch_size", i32::MAX);

    logger_name => LOGGER_NAME: String = ("logger.name", "fhirtest.access");
    /// Access log line template; `${...}` placeholders are filled per request.
    logger_format => LOGGER_FORMAT: String = (
        "logger.format",
        "Path[${servletPath}] Source[${requestHeader.x-forwarded-for}] \
         Operation[${operationType} ${operationName} ${idOrResourceName}] \
         UA[${requestHeader.user-agent}] Params[${requestParameters}] \
         ResponseEncoding[${responseEncodingNoDefault}]"
    );
    logger_error_format => LOGGER_ERROR_FORMAT: String =
        ("logger.error_format", "ERROR - ${requestVerb} ${requestUrl}");
    logger_log_exceptions => LOGGER_LOG_EXCEPTIONS: bool = ("logger.log_exceptions", true);

    data_source_driver => DATASOURCE_DRIVER: String =
        ("datasource.driver", "org.apache.derby.jdbc.EmbeddedDriver");
    data_source_max_pool_size => DATASOURCE_MAX_POOL_SIZE: i32 = ("datasource.max_pool_size", 10);
    data_source_url => DATASOURCE_URL: String = (
        "datasource.url",
        "jdbc:derby:directory:target/jpaserver_derby_files;create=true"
    );
    data_source_username => DATASOURCE_USERNAME: Option<String> = ("datasource.username", ());
    data_source_password => DATASOURCE_PASSWORD: Option<String> = ("datasource.password", ());

    binary_storage_enabled => BINARY_STORAGE_ENABLED: bool = ("binary_storage.enabled", true);
    allow_multiple_delete => ALLOW_MULTIPLE_DELETE: bool = ("allow_multiple_delete", false);
    allow_cascading_deletes => ALLOW_CASCADING_DELETES: bool = ("allow_cascading_deletes", false);
    allow_external_references => ALLOW_EXTERNAL_REFERENCES: bool =
        ("allow_external_references", false);
    allow_placeholder_references => ALLOW_PLACEHOLDER_REFERENCES: bool =
        ("allow_placeholder_references", true);
    allow_contains_searches => ALLOW_CONTAINS_SEARCHES: bool = ("allow_contains_searches", true);
    allow_override_default_search_params => ALLOW_OVERRIDE_DEFAULT_SEARCH_PARAMS: bool =
        ("allow_override_default_search_params", true);
    expunge_enabled => EXPUNGE_ENABLED: bool = ("expunge_enabled", true);

    test_port => TEST_PORT: i32 = ("test.port", 0);
    tester_refuse_to_fetch_third_party_urls => TESTER_REFUSE_TO_FETCH_THIRD_PARTY_URLS: bool =
        ("tester.config.refuse_to_fetch_third_party_urls", false);

    cors_enabled => CORS_ENABLED: bool = ("cors.enabled", true);
    cors_allowed_origin => CORS_ALLOWED_ORIGIN: String = ("cors.allowed_origin", "*");
    cors_allow_credentials => CORS_ALLOW_CREDENTIALS: bool = ("cors.allowCredentials", false);

    allowed_bundle_types => ALLOWED_BUNDLE_TYPES: String = ("allowed_bundle_types", "");
    /// Resource types the server exposes; empty means all of them.
    supported_resource_types => SUPPORTED_RESOURCE_TYPES: BTreeSet<String> =
        ("supported_resource_types", ());

    subscription_email_enabled => SUBSCRIPTION_EMAIL_ENABLED: bool =
        ("subscription.email.enabled", false);
    subscription_rest_hook_enabled => SUBSCRIPTION_RESTHOOK_ENABLED: bool =
        ("subscription.resthook.enabled", false);
    subscription_websocket_enabled => SUBSCRIPTION_WEBSOCKET_ENABLED: bool =
        ("subscription.websocket.enabled", false);

    email_enabled => EMAIL_ENABLED: bool = ("email.enabled", false);
    email_from => EMAIL_FROM: String = ("email.from", "some@test.com");
    email_host => EMAIL_HOST: Option<String> = ("email.host", ());
    email_port => EMAIL_PORT: i32 = ("email.port", 0);
    email_username => EMAIL_USERNAME: Option<String> = ("email.username", ());
    email_password => EMAIL_PASSWORD: Option<String> = ("email.password", ());

    /// How long identical searches reuse cached results; negative disables reuse.
    reuse_cached_search_results_millis => REUSE_CACHED_SEARCH_RESULTS_MILLIS: i64 =
        ("reuse_cached_search_results_millis", "-1");

    validate_requests_enabled => VALIDATE_REQUESTS_ENABLED: bool =
        ("validation.requests.enabled", false);
    validate_responses_enabled => VALIDATE_RESPONSES_ENABLED: bool =
        ("validation.responses.enabled", false);
    filter_search_enabled => FILTER_SEARCH_ENABLED: bool = ("filter_search.enabled", true);
    graphql_enabled => GRAPHQL_ENABLED: bool = ("graphql.enabled", true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;
    use crate::config::loader::{BaseSource, OverrideSource, Sources};
    use std::collections::HashSet;
    use std::fs;
    use tempfile::TempDir;

    fn empty_store() -> ConfigurationStore {
        ConfigurationStore::new(Sources::inline(""))
    }

    #[test]
    fn catalog_keys_are_unique() {
        let keys: HashSet<_> = CATALOG.iter().map(|d| d.key()).collect();
        assert_eq!(keys.len(), CATALOG.len());
        assert_eq!(CATALOG.len(), 48);
    }

    #[test]
    fn every_parameter_resolves_to_its_default_when_unset() {
        let store = empty_store();
        for descriptor in CATALOG {
            let resolved = descriptor.resolve_display(&store).expect("default resolves");
            assert_eq!(resolved, descriptor.default_display(), "key {}", descriptor.key());
        }
    }

    #[test]
    fn every_parameter_treats_empty_as_unset() {
        let text: String = CATALOG.iter().map(|d| format!("{}=\n", d.key())).collect();
        let store = ConfigurationStore::new(Sources::inline(text));
        for descriptor in CATALOG {
            let resolved = descriptor.resolve_display(&store).expect("default resolves");
            assert_eq!(resolved, descriptor.default_display(), "key {}", descriptor.key());
        }
    }

    #[test]
    fn representative_defaults() {
        let store = empty_store();
        assert_eq!(store.fhir_version().expect("get"), FhirVersion::Dstu3);
        assert_eq!(store.default_encoding().expect("get"), Encoding::Json);
        assert_eq!(store.etag_support().expect("get"), ETagSupport::Enabled);
        assert_eq!(store.default_page_size().expect("get"), 20);
        assert_eq!(store.maximum_page_size().expect("get"), 200);
        assert_eq!(store.maximum_fetch_size().expect("get"), i32::MAX);
        assert_eq!(store.data_source_max_pool_size().expect("get"), 10);
        assert_eq!(store.cors_allowed_origin().expect("get"), "*");
        assert_eq!(store.reuse_cached_search_results_millis().expect("get"), -1);
        assert_eq!(store.server_address().expect("get"), None);
        assert!(store.binary_storage_enabled().expect("get"));
        assert!(store.cors_enabled().expect("get"));
        assert!(!store.allow_multiple_delete().expect("get"));
    }

    #[test]
    fn enum_accessor_reads_configured_constant() {
        let store = ConfigurationStore::new(Sources::inline("fhir_version=R4\n"));
        assert_eq!(store.fhir_version().expect("get"), FhirVersion::R4);

        store.set_override("fhir_version", "BOGUS").expect("set");
        assert!(matches!(store.fhir_version(), Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn integer_accessor_does_not_fall_back_on_garbage() {
        let store = ConfigurationStore::new(Sources::inline("default_page_size=abc\n"));
        assert!(store.default_page_size().is_err());
    }

    #[test]
    fn cors_enabled_follows_the_override_layer() {
        let tmp = TempDir::new().expect("tmp");
        let base = tmp.path().join("hapi.properties");
        fs::write(&base, "cors.enabled=false\n").expect("write base");

        let without_override = ConfigurationStore::new(Sources::new(
            BaseSource::File(base.clone()),
            OverrideSource::Disabled,
        ));
        assert!(!without_override.cors_enabled().expect("get"));

        let override_path = tmp.path().join("override.properties");
        fs::write(&override_path, "cors.enabled=true\n").expect("write override");
        let with_override = ConfigurationStore::new(Sources::new(
            BaseSource::File(base),
            OverrideSource::File(override_path),
        ));
        assert!(with_override.cors_enabled().expect("get"));
    }

    #[test]
    fn supported_resource_types_splits_on_commas() {
        let store = ConfigurationStore::new(Sources::inline(
            "supported_resource_types=Patient, Observation ,,Encounter\n",
        ));
        let types = store.supported_resource_types().expect("get");
        assert_eq!(types.len(), 3);
        assert!(types.contains("Observation"));
    }

    #[test]
    fn find_returns_typed_descriptor_info() {
        let descriptor = find("datasource.max_pool_size").expect("known key");
        assert_eq!(descriptor.type_name(), "integer");
        assert_eq!(descriptor.default_display(), "10");
        assert!(find("no.such.key").is_none());
    }
}
