//! Common model fixtures for tests.

pub const PERSON: &str = "\
entity:
    id: Person
    name: \"Person\"
    attributes:
      - id: Name
        datatype: \"Varchar\"
";

pub const CUSTOMER: &str = "\
entity:
    id: Customer
    name: \"Customer\"
    inherits:
      - Person
    attributes:
      - id: Id
        name: \"Id\"
        datatype: \"Integer\"
        identifier: true
      - id: City
        datatype: \"Varchar\"
        length: 40
";

pub const ORDER: &str = "\
entity:
    id: Order
    attributes:
      - id: Id
        datatype: \"Integer\"
        identifier: true
      - id: CustomerId
        datatype: \"Integer\"
";

pub const CUSTOMER_HISTORY: &str = "\
entity:
    id: CustomerHistory
    attributes:
      - id: Id
        datatype: \"Integer\"
      - id: Orders
        datatype: \"Integer\"
";

pub const ORDER_CUSTOMER: &str = "\
relationship:
    id: Order_Customer
    parent: Customer
    parentCardinality: one
    child: Order
    childCardinality: multiple
    attributes:
      - parent: Customer.Id
        child: Order.CustomerId
";

pub const CUSTOMER_HISTORY_MAPPING: &str = "\
mapping:
    id: CustomerHistoryMapping
    sources:
      - id: CustomerSource
        entity: Customer
        join: from
      - id: OrderSource
        entity: Order
        join: left-join
        dependencies:
          - CustomerSource
        conditions:
          - OrderSource.CustomerId = CustomerSource.Id
    target:
        entity: CustomerHistory
        mappings:
          - attribute: Id
            sources:
              - CustomerSource.Id
            expression: \"{{CustomerSource.Id}}\"
";

pub const MAIN_DIAGRAM: &str = "\
systemDiagram:
    id: Main
    nodes:
      - id: CustomerNode
        entity: Customer
        x: 100
        y: 100
        width: 200
        height: 150
      - id: OrderNode
        entity: Order
        x: 400
        y: 100
        width: 200
        height: 150
    edges:
      - id: OrderCustomerEdge
        relationship: Order_Customer
        sourceNode: OrderNode
        targetNode: CustomerNode
";

/// A complete, valid single-package workspace.
pub fn shop_workspace() -> Vec<(&'static str, &'static str)> {
    vec![
        ("/ws/shop/Person.entity.cm", PERSON),
        ("/ws/shop/Customer.entity.cm", CUSTOMER),
        ("/ws/shop/Order.entity.cm", ORDER),
        ("/ws/shop/CustomerHistory.entity.cm", CUSTOMER_HISTORY),
        ("/ws/shop/Order_Customer.relationship.cm", ORDER_CUSTOMER),
        ("/ws/shop/CustomerHistoryMapping.mapping.cm", CUSTOMER_HISTORY_MAPPING),
        ("/ws/shop/Main.system-diagram.cm", MAIN_DIAGRAM),
    ]
}
