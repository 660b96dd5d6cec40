use codeintel_protocol::{Accessibility, NamespaceStyle, SymbolKind};
use codeintel_syntax::{CSharpParser, DeclaredType, DocumentModel};
use pretty_assertions::assert_eq;

const USER_SERVICE: &str = r#"
using System.Threading.Tasks;

namespace App.Services
{
    /// <summary>
    /// Application service for <see cref="T:App.Domain.User"/> accounts.
    /// </summary>
    [Service]
    public class UserService : ServiceBase, IUserService, IDisposable
    {
        private readonly IUserRepository _repository;
        public const int MaxUsers = 100;

        public UserService(IUserRepository repository)
        {
            _repository = repository;
        }

        public string Name { get; set; }

        /// <summary>Loads a user.</summary>
        public async Task<User> GetUserAsync(int id, bool includeRoles = false)
        {
            var user = await _repository.FindAsync(id);
            return user;
        }

        public User Find(int id)
        {
            return _repository.Find(id);
        }

        public void Rename(ref string name, out int length) { length = name.Length; }

        private void Helper() { }

        public event EventHandler Changed;

        public void Dispose() { }
    }
}
"#;

fn parse(source: &str) -> DocumentModel {
    let mut parser = CSharpParser::new().expect("grammar loads");
    parser.parse("test.cs", source).expect("parse succeeds")
}

fn find_type<'a>(model: &'a DocumentModel, name: &str) -> &'a DeclaredType {
    model
        .types()
        .map(|(_, ty)| ty)
        .find(|ty| ty.name == name)
        .unwrap_or_else(|| panic!("missing type {name}"))
}

#[test]
fn block_namespace_type_identity() {
    let model = parse(USER_SERVICE);
    assert_eq!(model.namespaces.len(), 1);
    assert_eq!(model.namespaces[0].name, "App.Services");
    assert_eq!(model.namespace_style(), Some(NamespaceStyle::BlockScoped));
    assert_eq!(model.namespace_literals, vec!["App.Services".to_string()]);

    let service = find_type(&model, "UserService");
    assert_eq!(service.id, "T:App.Services.UserService");
    assert_eq!(service.signature, "App.Services.UserService");
    assert_eq!(service.kind, SymbolKind::Class);
    assert_eq!(service.accessibility, Accessibility::Public);
    assert_eq!(service.attributes, vec!["Service".to_string()]);
    assert_eq!(
        service.summary.as_deref(),
        Some("Application service for User accounts.")
    );
}

#[test]
fn base_list_is_split_into_base_and_interfaces() {
    let model = parse(USER_SERVICE);
    let service = find_type(&model, "UserService");
    assert_eq!(service.base_types, vec!["ServiceBase".to_string()]);
    assert_eq!(
        service.implemented_interfaces,
        vec!["IUserService".to_string(), "IDisposable".to_string()]
    );
}

#[test]
fn member_ids_and_signatures() {
    let model = parse(USER_SERVICE);
    let service = find_type(&model, "UserService");
    let ids: Vec<&str> = service.members.iter().map(|m| m.id.as_str()).collect();

    assert!(ids.contains(&"F:App.Services.UserService._repository"));
    assert!(ids.contains(&"F:App.Services.UserService.MaxUsers"));
    assert!(ids.contains(&"M:App.Services.UserService.#ctor(IUserRepository)"));
    assert!(ids.contains(&"P:App.Services.UserService.Name"));
    assert!(ids.contains(&"M:App.Services.UserService.GetUserAsync(int,bool)"));
    assert!(ids.contains(&"M:App.Services.UserService.Rename(string@,int@)"));
    assert!(ids.contains(&"M:App.Services.UserService.Helper"));
    assert!(ids.contains(&"E:App.Services.UserService.Changed"));

    let get = service
        .members
        .iter()
        .find(|m| m.name == "GetUserAsync")
        .expect("GetUserAsync");
    assert_eq!(get.kind, SymbolKind::Method);
    assert_eq!(
        get.signature,
        "App.Services.UserService.GetUserAsync(int, bool)"
    );
    assert_eq!(get.return_type.as_deref(), Some("Task<User>"));
    assert!(get.has_modifier("async"));
    assert_eq!(get.summary.as_deref(), Some("Loads a user."));
    assert_eq!(get.parameters[1].default_value.as_deref(), Some("false"));

    let rename = service
        .members
        .iter()
        .find(|m| m.name == "Rename")
        .expect("Rename");
    assert_eq!(
        rename.signature,
        "App.Services.UserService.Rename(ref string, out int)"
    );

    let ctor = service
        .members
        .iter()
        .find(|m| m.kind == SymbolKind::Constructor)
        .expect("ctor");
    assert_eq!(
        ctor.signature,
        "App.Services.UserService.UserService(IUserRepository)"
    );
}

#[test]
fn default_accessibility_and_modifiers() {
    let model = parse(USER_SERVICE);
    let service = find_type(&model, "UserService");
    let helper = service.members.iter().find(|m| m.name == "Helper").unwrap();
    assert_eq!(helper.accessibility, Accessibility::Private);
    let repo = service
        .members
        .iter()
        .find(|m| m.name == "_repository")
        .unwrap();
    assert_eq!(repo.accessibility, Accessibility::Private);
    assert!(repo.has_modifier("readonly"));
    let max = service.members.iter().find(|m| m.name == "MaxUsers").unwrap();
    assert!(max.has_modifier("const"));
}

#[test]
fn forwarding_methods_are_flagged() {
    let model = parse(USER_SERVICE);
    let service = find_type(&model, "UserService");
    let flagged: Vec<&str> = service
        .members
        .iter()
        .filter(|m| m.is_forwarding)
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(flagged, vec!["Find"]);
}

#[test]
fn file_scoped_namespace_and_nested_types() {
    let source = r#"
namespace App.Domain;

public interface IRepository<T>
{
    T Get(int id);
}

public class Outer
{
    public class Inner { }
    enum Mode { On, Off }
}

public record Person(string Name, int Age);
"#;
    let model = parse(source);
    assert_eq!(model.namespace_style(), Some(NamespaceStyle::FileScoped));
    assert!(model.namespaces.iter().all(|ns| ns.name == "App.Domain"));

    let repo = find_type(&model, "IRepository");
    assert_eq!(repo.id, "T:App.Domain.IRepository`1");
    assert_eq!(repo.signature, "App.Domain.IRepository<T>");
    assert_eq!(repo.kind, SymbolKind::Interface);
    let get = &repo.members[0];
    assert_eq!(get.id, "M:App.Domain.IRepository`1.Get(int)");
    assert_eq!(get.accessibility, Accessibility::Public);
    assert!(!get.has_body);

    let inner = find_type(&model, "Outer.Inner");
    assert_eq!(inner.id, "T:App.Domain.Outer.Inner");
    assert_eq!(inner.accessibility, Accessibility::Public);

    let mode = find_type(&model, "Outer.Mode");
    assert_eq!(mode.kind, SymbolKind::Enum);
    assert_eq!(mode.accessibility, Accessibility::Private);
    let members: Vec<&str> = mode.members.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(
        members,
        vec!["F:App.Domain.Outer.Mode.On", "F:App.Domain.Outer.Mode.Off"]
    );

    let person = find_type(&model, "Person");
    assert_eq!(person.kind, SymbolKind::Record);
    let props: Vec<&str> = person.members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(props, vec!["Name", "Age"]);
}

#[test]
fn files_without_namespace_use_global() {
    let model = parse("class Program { static void Main() { } }");
    assert_eq!(model.namespaces.len(), 1);
    assert_eq!(model.namespaces[0].name, codeintel_protocol::GLOBAL_NAMESPACE);
    let program = find_type(&model, "Program");
    assert_eq!(program.id, "T:Program");
    assert_eq!(program.accessibility, Accessibility::Internal);
    assert_eq!(program.members[0].id, "M:Program.Main");
    assert_eq!(model.namespace_style(), None);
}

#[test]
fn nested_block_namespaces_are_qualified() {
    let model = parse("namespace A { namespace B { class C { } } }");
    let c = find_type(&model, "C");
    assert_eq!(c.id, "T:A.B.C");
    assert_eq!(model.namespaces[0].name, "A.B");
}

#[test]
fn auto_generated_header_is_reported() {
    let model = parse("// <auto-generated>\n// generated\n// </auto-generated>\nclass G { }");
    assert!(model.auto_generated);
    assert_eq!(model.line_count, 4);
}

#[test]
fn grammar_loads_and_yields_declarations() {
    let mut parser = CSharpParser::new().expect("grammar version matches the runtime");
    let model = parser
        .parse("Order.cs", "namespace Shop;\npublic class Order { public int Id { get; set; } }\n")
        .expect("parse succeeds");
    assert_eq!(model.namespaces.len(), 1);
    let order = find_type(&model, "Order");
    assert_eq!(order.id, "T:Shop.Order");
    assert_eq!(order.members.len(), 1);
}

#[test]
fn forwarding_requires_identifier_arguments() {
    let model = parse(
        r#"
class Proxy
{
    private readonly Inner _inner;
    public int Pass(int a, int b) => _inner.Add(a, b);
    public int Fixed(int a) => _inner.Add(a, 1);
    public string Text() { return _inner.Say("hi"); }
    public void None() { _inner.Reset(); }
}
"#,
    );
    let proxy = find_type(&model, "Proxy");
    let mut flagged: Vec<&str> = proxy
        .members
        .iter()
        .filter(|m| m.is_forwarding)
        .map(|m| m.name.as_str())
        .collect();
    flagged.sort_unstable();
    assert_eq!(flagged, vec!["None", "Pass"]);
}
