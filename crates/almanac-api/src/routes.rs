//! Route and handler wiring for the resource surface.
//!
//! Every resource kind exposes the same five operations:
//!
//! | Method | Path                 | Operation id    |
//! |--------|----------------------|-----------------|
//! | GET    | `{base}/all`         | `list{Stem}`    |
//! | GET    | `{base}?id=`         | `get{Stem}`     |
//! | POST   | `{base}/post?...`    | `create{Stem}`  |
//! | PUT    | `{base}?id=` + body  | `update{Stem}`  |
//! | DELETE | `{base}?id=`         | `delete{Stem}`  |
//!
//! Creates take their fields as query-string arguments; updates take
//! the identifier in the query string and the fields as a JSON body.

use almanac_core::RequestContext;
use almanac_server::{HandlerRegistry, RawRequest, Router};
use almanac_store::Repository;
use http::Method;
use serde::Deserialize;

use crate::controller::ResourceController;
use crate::resource::Resource;

/// The `?id=` query argument shared by get, update, and delete.
///
/// A missing or non-integer id fails deserialization, which surfaces
/// as a 400.
#[derive(Debug, Deserialize)]
struct IdQuery {
    id: i64,
}

/// Registers the five CRUD routes and handlers for one resource kind.
pub fn register_resource<E, R>(
    router: &mut Router,
    registry: &mut HandlerRegistry,
    controller: &ResourceController<E, R>,
) where
    E: Resource,
    R: Repository<E>,
{
    let stem = E::OPERATION_STEM;
    let list_op = format!("list{stem}");
    let get_op = format!("get{stem}");
    let create_op = format!("create{stem}");
    let update_op = format!("update{stem}");
    let delete_op = format!("delete{stem}");

    router.add_route(Method::GET, format!("{}/all", E::BASE_PATH), &list_op);
    router.add_route(Method::GET, E::BASE_PATH, &get_op);
    router.add_route(Method::POST, format!("{}/post", E::BASE_PATH), &create_op);
    router.add_route(Method::PUT, E::BASE_PATH, &update_op);
    router.add_route(Method::DELETE, E::BASE_PATH, &delete_op);

    let c = controller.clone();
    registry.register(list_op, move |ctx: RequestContext, _req: RawRequest| {
        let c = c.clone();
        async move { Ok(c.list(&ctx).await?) }
    });

    let c = controller.clone();
    registry.register(get_op, move |ctx: RequestContext, req: RawRequest| {
        let c = c.clone();
        async move {
            let IdQuery { id } = req.query()?;
            Ok(c.get(&ctx, id).await?)
        }
    });

    let c = controller.clone();
    registry.register(create_op, move |ctx: RequestContext, req: RawRequest| {
        let c = c.clone();
        async move {
            let payload: E::Payload = req.query()?;
            Ok(c.create(&ctx, payload).await?)
        }
    });

    let c = controller.clone();
    registry.register(update_op, move |ctx: RequestContext, req: RawRequest| {
        let c = c.clone();
        async move {
            let IdQuery { id } = req.query()?;
            let payload: E::Payload = req.json()?;
            Ok(c.update(&ctx, id, payload).await?)
        }
    });

    let c = controller.clone();
    registry.register(delete_op, move |ctx: RequestContext, req: RawRequest| {
        let c = c.clone();
        async move {
            let IdQuery { id } = req.query()?;
            Ok(c.delete(&ctx, id).await?)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Book;
    use almanac_core::CallerIdentity;
    use almanac_server::handler::InvokeError;
    use almanac_store::MemoryRepository;
    use bytes::Bytes;
    use std::sync::Arc;

    fn wired() -> (Router, HandlerRegistry) {
        let controller: ResourceController<Book, _> =
            ResourceController::new(Arc::new(MemoryRepository::new()));
        let mut router = Router::new();
        let mut registry = HandlerRegistry::new();
        register_resource(&mut router, &mut registry, &controller);
        (router, registry)
    }

    fn admin_ctx() -> RequestContext {
        RequestContext::mock()
            .with_identity(CallerIdentity::user("editor").with_roles(["ROLE_ADMIN"]))
    }

    #[test]
    fn test_registers_five_routes_and_handlers() {
        let (router, registry) = wired();
        assert_eq!(router.route_count(), 5);
        assert_eq!(registry.len(), 5);
        for op in ["listBook", "getBook", "createBook", "updateBook", "deleteBook"] {
            assert!(registry.contains(op), "missing handler for {op}");
            assert!(router.has_operation(op), "missing route for {op}");
        }
    }

    #[test]
    fn test_route_table_shape() {
        let (router, _) = wired();
        assert_eq!(
            router
                .match_route(&Method::GET, "/api/book/all")
                .unwrap()
                .operation_id(),
            "listBook"
        );
        assert_eq!(
            router
                .match_route(&Method::POST, "/api/book/post")
                .unwrap()
                .operation_id(),
            "createBook"
        );
        assert_eq!(
            router
                .match_route(&Method::DELETE, "/api/book")
                .unwrap()
                .operation_id(),
            "deleteBook"
        );
    }

    #[tokio::test]
    async fn test_create_from_query_string() {
        let (_, registry) = wired();
        let req = RawRequest::new("title=IT&author=Stephen+King&genre=Horror", Bytes::new());

        let bytes = registry.invoke("createBook", admin_ctx(), req).await.unwrap();
        let book: Book = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(book.id, Some(1));
        assert_eq!(book.author, "Stephen King");
    }

    #[tokio::test]
    async fn test_update_reads_id_from_query_and_fields_from_body() {
        let (_, registry) = wired();
        let create = RawRequest::new("title=Old&author=A&genre=G", Bytes::new());
        registry.invoke("createBook", admin_ctx(), create).await.unwrap();

        let update = RawRequest::new(
            "id=1",
            Bytes::from(r#"{"title":"New","author":"A","genre":"G"}"#),
        );
        let bytes = registry.invoke("updateBook", admin_ctx(), update).await.unwrap();
        let book: Book = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(book.id, Some(1));
        assert_eq!(book.title, "New");
    }

    #[tokio::test]
    async fn test_delete_requires_integer_id() {
        let (_, registry) = wired();
        let req = RawRequest::new("id=abc", Bytes::new());

        let err = registry.invoke("deleteBook", admin_ctx(), req).await.unwrap_err();
        assert!(matches!(
            err,
            InvokeError::HandlerError(almanac_server::HandlerError::BadRequest(_))
        ));
    }
}
