/// DDL for the hosted `produtos` table: columns, indexes and row-level
/// security. Reads are public; writes need an authenticated user.
pub const PRODUCTS_TABLE_DDL: &str = r"-- Products table
CREATE TABLE IF NOT EXISTS produtos (
  id UUID DEFAULT gen_random_uuid() PRIMARY KEY,
  nome VARCHAR(255) NOT NULL,
  marca VARCHAR(100) NOT NULL,
  preco DECIMAL(10,2) NOT NULL CHECK (preco > 0),
  descricao TEXT,
  imagem_url TEXT NOT NULL,
  estoque INTEGER DEFAULT 0 CHECK (estoque >= 0),
  categorias TEXT[] DEFAULT ARRAY['tenis'],
  cores JSONB NOT NULL DEFAULT '[]'::jsonb,
  created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW(),
  updated_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_produtos_marca ON produtos(marca);
CREATE INDEX IF NOT EXISTS idx_produtos_categorias ON produtos USING GIN(categorias);
CREATE INDEX IF NOT EXISTS idx_produtos_created_at ON produtos(created_at);

ALTER TABLE produtos ENABLE ROW LEVEL SECURITY;

DROP POLICY IF EXISTS produtos_public_read ON produtos;
DROP POLICY IF EXISTS produtos_authenticated_insert ON produtos;
DROP POLICY IF EXISTS produtos_authenticated_update ON produtos;
DROP POLICY IF EXISTS produtos_authenticated_delete ON produtos;

CREATE POLICY produtos_public_read ON produtos
  FOR SELECT USING (true);

CREATE POLICY produtos_authenticated_insert ON produtos
  FOR INSERT WITH CHECK (auth.uid() IS NOT NULL);

CREATE POLICY produtos_authenticated_update ON produtos
  FOR UPDATE USING (auth.uid() IS NOT NULL);

CREATE POLICY produtos_authenticated_delete ON produtos
  FOR DELETE USING (auth.uid() IS NOT NULL);
";

/// [`PRODUCTS_TABLE_DDL`] for a table with a different name.
#[must_use]
pub fn products_table_ddl(table: &str) -> String {
    PRODUCTS_TABLE_DDL.replace("produtos", table)
}
